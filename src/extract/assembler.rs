use crate::domain::model::{MonthlyTable, StationCode, StationRecord, TargetStationSet};
use crate::extract::coordinates::CoordinateParser;
use crate::extract::fields::FieldPatterns;
use crate::extract::locator::{page_lines, StationLocator};
use crate::extract::monthly::extract_monthly_table;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_HEADER_WINDOW: usize = 15;

/// Year of a yearbook from its file name: the first run of exactly four digits.
pub fn year_from_file_name(name: &str) -> Result<i32> {
    let re = Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)")?;
    re.captures(name)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| EtlError::InvalidFileName {
            name: name.to_string(),
        })
}

/// Result of scanning every page of one yearbook.
#[derive(Debug, Clone, Default)]
pub struct YearbookExtraction {
    pub year: i32,
    pub source_file: String,
    pub pages_scanned: usize,
    pub records: Vec<StationRecord>,
}

/// Turns one page of yearbook text into a [`StationRecord`].
pub struct StationPageParser {
    locator: StationLocator,
    fields: FieldPatterns,
    coordinates: CoordinateParser,
    header_window: usize,
}

impl StationPageParser {
    pub fn new(header_window: usize) -> Result<Self> {
        Ok(Self {
            locator: StationLocator::new()?,
            fields: FieldPatterns::new()?,
            coordinates: CoordinateParser::new()?,
            header_window: header_window.max(1),
        })
    }

    /// Returns `None` for pages that do not document a target station.
    pub fn parse_page(
        &self,
        page_text: &str,
        page: usize,
        year: i32,
        source_file: &str,
        targets: &TargetStationSet,
    ) -> Option<StationRecord> {
        let lines = page_lines(page_text);
        let located = self.locator.locate(&lines, targets)?;

        let section = &lines[located.line_index..];
        let header = &section[..section.len().min(self.header_window)];

        let mut record = StationRecord::new(located.code, located.name, year);
        record.region = located.region;
        record.source_file = Some(source_file.to_string());
        record.page = Some(page);
        record.catchment_area_km2 = self.fields.catchment_area(header);
        record.elevation_m = self.fields.elevation(header);
        record.observation_period = self.fields.observation_period(header);
        record.coordinates = self.coordinates.extract(header);
        record.annual_avg_flow_m3s = self.fields.annual_avg_flow(header, year);

        let totals = self.fields.annual_totals(section);
        record.annual_total_flow_million_m3 = totals.total_flow_million_m3;
        record.annual_runoff_mm = totals.runoff_mm;
        record.annual_specific_flow_lt_sn_km2 = totals.specific_flow_lt_sn_km2;

        record.monthly = extract_monthly_table(section);

        for (field, missing) in [
            ("catchment_area_km2", record.catchment_area_km2.is_none()),
            ("annual_avg_flow_m3s", record.annual_avg_flow_m3s.is_none()),
            ("coordinates", record.coordinates.is_none()),
        ] {
            if missing {
                tracing::debug!(
                    "{} ({}): no match for {} on page {}",
                    record.station_code,
                    year,
                    field,
                    page
                );
            }
        }

        let present = record.monthly.present_count();
        if present * 2 < MonthlyTable::CELL_COUNT {
            tracing::warn!(
                "⚠️ {} ({}): only {}/{} monthly values extracted from page {}",
                record.station_code,
                year,
                present,
                MonthlyTable::CELL_COUNT,
                page
            );
        }

        Some(record)
    }

    /// Scans the pages of one yearbook in order; pages are numbered from 1.
    pub fn parse_yearbook(
        &self,
        pages: &[String],
        year: i32,
        source_file: &str,
        targets: &TargetStationSet,
    ) -> YearbookExtraction {
        let records: Vec<StationRecord> = pages
            .iter()
            .enumerate()
            .filter_map(|(i, text)| self.parse_page(text, i + 1, year, source_file, targets))
            .collect();

        tracing::info!(
            "📄 {}: {} station pages found, {} pages skipped",
            source_file,
            records.len(),
            pages.len() - records.len()
        );

        YearbookExtraction {
            year,
            source_file: source_file.to_string(),
            pages_scanned: pages.len(),
            records,
        }
    }
}

/// Collects records for a run, keeping one per (station, year).
#[derive(Debug, Default)]
pub struct RecordAssembler {
    records: BTreeMap<(StationCode, i32), StationRecord>,
    duplicates_dropped: usize,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// On a duplicate key the more complete record stays; ties keep the first.
    pub fn push(&mut self, record: StationRecord) {
        let key = (record.station_code.clone(), record.year);
        match self.records.get_mut(&key) {
            Some(existing) => {
                self.duplicates_dropped += 1;
                if record.completeness() > existing.completeness() {
                    tracing::debug!(
                        "{} ({}): replacing duplicate with more complete page {:?}",
                        key.0,
                        key.1,
                        record.page
                    );
                    *existing = record;
                } else {
                    tracing::debug!("{} ({}): duplicate skipped", key.0, key.1);
                }
            }
            None => {
                self.records.insert(key, record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn stations_for_year(&self, year: i32) -> BTreeSet<&str> {
        self.records
            .keys()
            .filter(|(_, y)| *y == year)
            .map(|(code, _)| code.as_str())
            .collect()
    }

    /// Records sorted by station code, then year.
    pub fn into_records(self) -> Vec<StationRecord> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Metric, Month};

    const PAGE: &str = "\
22 - MÜTEFERRİK DOĞU KARADENİZ SULARI
D22A093 TURNASUYU CUMHURİYET KÖYÜ
YERİ : Ordu ili, Cumhuriyet köyü
KOORDİNAT : 37°53'10\" Doğu - 40°58'20\" Kuzey
YAĞIŞ ALANI : 210,00 km2 YAKLAŞIK KOT : 404 m
GÖZLEM SÜRESİ : 1964-2005
ORTALAMA AKIMLAR : 41 yılda 5,12 m3/sn. 2005 Su yılında 4,87 m3/sn.
2005 Su yılında ortalama akım 4,87 m3/sn
Maks. 0,54 1,32 0,62 KURU 2,10 3,40 5,60 8,90 4,10 1,20 0,80 0,60 8,90
Min. 0,10 0,20 0,30 KURU 0,50 0,60 0,70 0,80 0,90 0,40 0,30 0,20 KURU
Ortalama 0,30 0,70 0,45 KURU 1,10 2,00 3,10 4,50 2,20 0,90 0,55 0,40 1,35
LT/SN/Km2 1,4 3,3 2,1 KURU 5,2 9,5 14,8 21,4 10,5 4,3 2,6 1,9 6,4
AKIM mm. 3,8 8,6 5,7 KURU 12,7 25,5 38,3 57,4 27,2 11,5 7,0 5,0 202,7
MİL. M3 0,80 1,81 1,21 KURU 2,66 5,36 8,03 12,05 5,70 2,41 1,47 1,04 42,54
YILLIK TOPLAM AKIM : 42,54 MİLYON M3  202,7 MM.  6,4 LT/SN/Km2
";

    fn targets() -> TargetStationSet {
        TargetStationSet::from_codes(["D22A093"]).unwrap()
    }

    #[test]
    fn test_year_from_file_name() {
        assert_eq!(year_from_file_name("dsi_2005.pdf").unwrap(), 2005);
        assert_eq!(year_from_file_name("DSI_yilligi_2019_son.txt").unwrap(), 2019);
        assert_eq!(year_from_file_name("v12_dsi_2010.pdf").unwrap(), 2010);
        assert!(year_from_file_name("dsi_20051.pdf").is_err());
        assert!(year_from_file_name("dsi.pdf").is_err());
        assert_eq!(year_from_file_name("2008").unwrap(), 2008);
        assert_eq!(year_from_file_name("dsi_123_2011.txt").unwrap(), 2011);
    }

    #[test]
    fn test_parse_full_station_page() {
        let parser = StationPageParser::new(DEFAULT_HEADER_WINDOW).unwrap();
        let record = parser
            .parse_page(PAGE, 7, 2005, "dsi_2005.pdf", &targets())
            .unwrap();

        assert_eq!(record.station_code.as_str(), "D22A093");
        assert_eq!(record.station_name, "TURNASUYU CUMHURİYET KÖYÜ");
        assert_eq!(record.region.as_deref(), Some("22 - MÜTEFERRİK DOĞU KARADENİZ SULARI"));
        assert_eq!(record.catchment_area_km2, Some(210.0));
        assert_eq!(record.elevation_m, Some(404.0));
        assert_eq!(record.observation_period.as_deref(), Some("1964-2005"));
        assert_eq!(record.annual_avg_flow_m3s, Some(4.87));
        assert_eq!(record.annual_total_flow_million_m3, Some(42.54));
        assert_eq!(record.annual_runoff_mm, Some(202.7));
        assert_eq!(record.annual_specific_flow_lt_sn_km2, Some(6.4));
        assert!(record.coordinates.as_ref().and_then(|c| c.lat_lon()).is_some());
        assert_eq!(record.page, Some(7));

        assert_eq!(record.monthly.get(Metric::FlowMax, Month::Oct), Some(0.54));
        assert_eq!(record.monthly.get(Metric::FlowMax, Month::Jan), Some(0.0));
        // The ORTALAMA AKIMLAR heading above the table is not the average row.
        assert_eq!(record.monthly.get(Metric::FlowAvg, Month::Oct), Some(0.3));
        assert_eq!(record.monthly.get(Metric::FlowAvg, Month::Nov), Some(0.7));
        assert_eq!(record.monthly.get(Metric::VolumeMilM3, Month::Sep), Some(1.04));
        assert_eq!(record.monthly.present_count(), 72);
    }

    #[test]
    fn test_header_window_limits_header_fields() {
        let parser = StationPageParser::new(2).unwrap();
        let record = parser
            .parse_page(PAGE, 1, 2005, "dsi_2005.pdf", &targets())
            .unwrap();
        assert_eq!(record.catchment_area_km2, None);
        // Table rows are read from the whole section.
        assert_eq!(record.monthly.present_count(), 72);
    }

    #[test]
    fn test_non_target_page() {
        let parser = StationPageParser::new(DEFAULT_HEADER_WINDOW).unwrap();
        let others = TargetStationSet::from_codes(["E22A054"]).unwrap();
        assert!(parser
            .parse_page(PAGE, 1, 2005, "dsi_2005.pdf", &others)
            .is_none());
    }

    #[test]
    fn test_parse_yearbook_numbers_pages_from_one() {
        let parser = StationPageParser::new(DEFAULT_HEADER_WINDOW).unwrap();
        let pages = vec!["KAPAK".to_string(), PAGE.to_string()];
        let extraction = parser.parse_yearbook(&pages, 2005, "dsi_2005.pdf", &targets());
        assert_eq!(extraction.pages_scanned, 2);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].page, Some(2));
    }

    #[test]
    fn test_assembler_keeps_most_complete_duplicate() {
        let code = StationCode::parse("D22A093").unwrap();
        let sparse = StationRecord::new(code.clone(), "A", 2005);
        let mut full = StationRecord::new(code.clone(), "B", 2005);
        full.annual_avg_flow_m3s = Some(4.87);
        let mut tie = StationRecord::new(code, "C", 2005);
        tie.catchment_area_km2 = Some(1.0);

        let mut assembler = RecordAssembler::new();
        assembler.push(sparse);
        assembler.push(full);
        assembler.push(tie);

        assert_eq!(assembler.len(), 1);
        assert_eq!(assembler.duplicates_dropped(), 2);
        let records = assembler.into_records();
        assert_eq!(records[0].station_name, "B");
    }

    #[test]
    fn test_assembler_orders_by_station_then_year() {
        let mut assembler = RecordAssembler::new();
        for (code, year) in [("E22A054", 2005), ("D22A093", 2006), ("D22A093", 2005)] {
            assembler.push(StationRecord::new(StationCode::parse(code).unwrap(), "", year));
        }
        assert_eq!(assembler.stations_for_year(2005).len(), 2);

        let keys: Vec<(String, i32)> = assembler
            .into_records()
            .into_iter()
            .map(|r| (r.station_code.to_string(), r.year))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("D22A093".to_string(), 2005),
                ("D22A093".to_string(), 2006),
                ("E22A054".to_string(), 2005)
            ]
        );
    }
}
