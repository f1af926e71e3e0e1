use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Yeşilırmak and Doğu Karadeniz gauging stations tracked by default.
pub const DEFAULT_TARGET_STATIONS: &[&str] = &[
    "E22A065", "E22A066", "D22A093", "E22A071", "D14A185", "E22A054", "E22A063", "E14A018",
    "D14A162", "D14A186", "D22A105", "E22A053", "D14A172", "D14A117", "E14A027", "D22A106",
    "D14A200", "E14A002", "D14A179", "D22A098", "D22A159", "D14A064", "E14A038", "D14A201",
    "D14A184", "D14A211", "D14A208", "D14A214", "D14A207", "D14A141", "E22A062", "E14A040",
    "D14A215", "D14A176", "D14A011", "D14A188", "D14A081",
];

/// A DSİ gauging station code such as `D22A093`: `[DE]`, two digits, `A`, three digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if Self::is_valid(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(EtlError::validation(format!(
                "'{}' is not a station code (expected [DE]NNANNN)",
                code
            )))
        }
    }

    pub fn is_valid(code: &str) -> bool {
        let bytes = code.as_bytes();
        bytes.len() == 7
            && matches!(bytes[0], b'D' | b'E')
            && bytes[1..3].iter().all(u8::is_ascii_digit)
            && bytes[3] == b'A'
            && bytes[4..7].iter().all(u8::is_ascii_digit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StationCode {
    type Error = EtlError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<StationCode> for String {
    fn from(code: StationCode) -> Self {
        code.0
    }
}

/// Allow-list of stations for one run. Pages for other stations are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStationSet {
    codes: BTreeSet<StationCode>,
}

impl TargetStationSet {
    pub fn from_codes<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|code| StationCode::parse(code.as_ref()))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { codes })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.as_str() == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationCode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for TargetStationSet {
    fn default() -> Self {
        Self {
            codes: DEFAULT_TARGET_STATIONS
                .iter()
                .map(|code| StationCode(code.to_string()))
                .collect(),
        }
    }
}

/// Months of the water year in yearbook table order (October first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Oct,
    Nov,
    Dec,
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Oct,
        Month::Nov,
        Month::Dec,
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn code(self) -> &'static str {
        match self {
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sep => "sep",
        }
    }
}

/// The six summary rows of a yearbook's monthly flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    FlowMax,
    FlowMin,
    FlowAvg,
    SpecificFlow,
    RunoffMm,
    VolumeMilM3,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::FlowMax,
        Metric::FlowMin,
        Metric::FlowAvg,
        Metric::SpecificFlow,
        Metric::RunoffMm,
        Metric::VolumeMilM3,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column_suffix(self) -> &'static str {
        match self {
            Metric::FlowMax => "flow_max",
            Metric::FlowMin => "flow_min",
            Metric::FlowAvg => "flow_avg",
            Metric::SpecificFlow => "lt_sn_km2",
            Metric::RunoffMm => "akim_mm",
            Metric::VolumeMilM3 => "mil_m3",
        }
    }

    /// Row labels as they appear at the start of a table line.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Metric::FlowMax => &["Maks.", "MAKS."],
            Metric::FlowMin => &["Min.", "MIN."],
            Metric::FlowAvg => &["Ortalama"],
            Metric::SpecificFlow => &["LT/SN/Km2", "LT/SN/KM2", "Lt/Sn/Km2"],
            Metric::RunoffMm => &["AKIM mm.", "AKIM MM.", "Akım mm."],
            Metric::VolumeMilM3 => &["MİL. M3", "MIL. M3", "Mil. m3"],
        }
    }
}

pub fn monthly_column(metric: Metric, month: Month) -> String {
    format!("{}_{}", month.code(), metric.column_suffix())
}

pub fn annual_average_column(metric: Metric) -> String {
    format!("annual_average_{}", metric.column_suffix())
}

/// 6 metrics x 12 months of optional values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlyTable {
    cells: [[Option<f64>; 12]; 6],
}

impl MonthlyTable {
    pub fn get(&self, metric: Metric, month: Month) -> Option<f64> {
        self.cells[metric.index()][month.index()]
    }

    pub fn set(&mut self, metric: Metric, month: Month, value: Option<f64>) {
        self.cells[metric.index()][month.index()] = value;
    }

    pub fn row(&self, metric: Metric) -> &[Option<f64>; 12] {
        &self.cells[metric.index()]
    }

    pub fn set_row(&mut self, metric: Metric, values: [Option<f64>; 12]) {
        self.cells[metric.index()] = values;
    }

    pub fn present_count(&self) -> usize {
        self.cells.iter().flatten().filter(|v| v.is_some()).count()
    }

    pub const CELL_COUNT: usize = 72;
}

/// Station position as printed in the yearbook plus parsed decimal degrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coordinates {
    pub raw: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// One row per (station, year).
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub station_code: StationCode,
    pub station_name: String,
    pub year: i32,
    pub region: Option<String>,
    pub catchment_area_km2: Option<f64>,
    pub elevation_m: Option<f64>,
    pub observation_period: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub annual_avg_flow_m3s: Option<f64>,
    pub annual_total_flow_million_m3: Option<f64>,
    pub annual_runoff_mm: Option<f64>,
    pub annual_specific_flow_lt_sn_km2: Option<f64>,
    pub monthly: MonthlyTable,
    pub source_file: Option<String>,
    pub page: Option<usize>,
    pub annual_averages: Option<[Option<f64>; 6]>,
    pub distance_km: Option<f64>,
}

impl StationRecord {
    pub fn new(station_code: StationCode, station_name: impl Into<String>, year: i32) -> Self {
        Self {
            station_code,
            station_name: station_name.into(),
            year,
            region: None,
            catchment_area_km2: None,
            elevation_m: None,
            observation_period: None,
            coordinates: None,
            annual_avg_flow_m3s: None,
            annual_total_flow_million_m3: None,
            annual_runoff_mm: None,
            annual_specific_flow_lt_sn_km2: None,
            monthly: MonthlyTable::default(),
            source_file: None,
            page: None,
            annual_averages: None,
            distance_km: None,
        }
    }

    /// Number of extracted values present; used to pick between duplicates.
    pub fn completeness(&self) -> usize {
        let header = [
            self.catchment_area_km2,
            self.elevation_m,
            self.annual_avg_flow_m3s,
            self.annual_total_flow_million_m3,
            self.annual_runoff_mm,
            self.annual_specific_flow_lt_sn_km2,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count();
        let coordinates = self
            .coordinates
            .as_ref()
            .map_or(0, |c| usize::from(c.lat_lon().is_some()));

        header + coordinates + self.monthly.present_count()
    }
}

/// What happened to one numeric column during outlier correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCorrection {
    pub column: String,
    pub outliers_found: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub median_replacement: f64,
}

/// Time spent loading and parsing one yearbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearbookTiming {
    pub pages: usize,
    pub records: usize,
    pub elapsed_ms: u64,
}

/// Summary written next to the CSV after each run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: Option<DateTime<Utc>>,
    pub files_processed: Vec<String>,
    /// Yearbooks that could not be read, with the reason.
    #[serde(default)]
    pub files_failed: BTreeMap<String, String>,
    #[serde(default)]
    pub yearbook_timings: BTreeMap<String, YearbookTiming>,
    pub pages_scanned: usize,
    pub duplicates_dropped: usize,
    pub records_per_year: BTreeMap<i32, usize>,
    pub missing_stations: BTreeMap<i32, Vec<String>>,
    pub outlier_corrections: Vec<ColumnCorrection>,
    pub filled_per_station: BTreeMap<String, usize>,
}

/// Records pulled out of the yearbooks plus the bookkeeping gathered on the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<StationRecord>,
    pub report: RunReport,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<StationRecord>,
    pub csv_output: String,
    pub report: RunReport,
}
