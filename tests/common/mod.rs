#![allow(dead_code)]

use dsi_flow_etl::CliConfig;
use std::path::Path;

/// One station page as `pdftotext -layout` prints it.
pub fn station_page(code: &str, name: &str, year: i32, avg_flow: &str, monthly_scale: f64) -> String {
    let row = |label: &str, base: f64| {
        let cells: Vec<String> = (1..=12)
            .map(|m| format!("{:.2}", base * monthly_scale * m as f64).replace('.', ","))
            .collect();
        format!("{} {} {}", label, cells.join(" "), cells[11])
    };

    format!(
        "22 - MÜTEFERRİK DOĞU KARADENİZ SULARI\n\
         {code} {name}\n\
         YERİ : Sol sahilde, köprü yanında\n\
         KOORDİNAT : 37°53'10\" Doğu - 40°58'20\" Kuzey\n\
         YAĞIŞ ALANI : 210,00 km2 YAKLAŞIK KOT : 404 m\n\
         GÖZLEM SÜRESİ : 1964-{year}\n\
         ORTALAMA AKIMLAR : 41 yılda 5,12 m3/sn. {year} Su yılında {avg_flow} m3/sn.\n\
         {year} Su yılında ortalama akım {avg_flow} m3/sn\n\
         \n\
         AYLAR EKİM KASIM ARALIK OCAK ŞUBAT MART NİSAN MAYIS HAZİRAN TEMMUZ AĞUSTOS EYLÜL YILLIK\n\
         {max}\n\
         {min}\n\
         {avg}\n\
         {lt}\n\
         {mm}\n\
         {mil}\n\
         YILLIK TOPLAM AKIM : 153,60 MİLYON M3  731,4 MM.  23,19 LT/SN/Km2\n",
        max = row("Maks.", 3.0),
        min = row("Min.", 0.5),
        avg = row("Ortalama", 1.0),
        lt = row("LT/SN/Km2", 4.0),
        mm = row("AKIM mm.", 10.0),
        mil = row("MİL. M3", 2.0),
    )
}

/// Writes `dsi_<year>.txt` with the given pages separated by form feeds.
pub fn write_yearbook(dir: &Path, year: i32, pages: &[String]) {
    let mut text = pages.join("\x0c");
    text.push('\x0c');
    std::fs::write(dir.join(format!("dsi_{}.txt", year)), text).unwrap();
}

pub fn config(input_dir: &Path, output_path: &Path) -> CliConfig {
    CliConfig {
        year: None,
        years: vec![],
        input_dir: input_dir.to_path_buf(),
        output_path: output_path.to_string_lossy().to_string(),
        output_file: "records.csv".to_string(),
        stations: vec!["D22A093".to_string(), "E22A054".to_string()],
        concurrent_files: 2,
        header_window: 15,
        annual_averages: false,
        correct_outliers: false,
        fill_gaps: false,
        reference_lat: None,
        reference_lon: None,
        verbose: false,
        monitor: false,
    }
}
