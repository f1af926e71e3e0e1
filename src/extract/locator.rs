use crate::domain::model::{StationCode, TargetStationSet};
use crate::utils::error::Result;
use regex::Regex;

/// Where a target station's section starts on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedStation {
    pub code: StationCode,
    pub name: String,
    /// Index into [`page_lines`] of the station line.
    pub line_index: usize,
    /// Basin heading printed at the top of the page, if any.
    pub region: Option<String>,
}

/// Non-empty, stripped lines of a page.
pub fn page_lines(page_text: &str) -> Vec<&str> {
    page_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub struct StationLocator {
    station_line: Regex,
    region_heading: Regex,
}

impl StationLocator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            station_line: Regex::new(r"^([DE]\d{2}A\d{3})\b(.*)$")?,
            region_heading: Regex::new(
                r"(?i)^\d{1,2}\s*[-.]\s*\S.*(?:havzas[ıi]|sular[ıi])",
            )?,
        })
    }

    /// Splits a station line into its code and the station name after it.
    pub fn parse_station_line(&self, line: &str) -> Option<(StationCode, String)> {
        let caps = self.station_line.captures(line.trim())?;
        let code = StationCode::parse(&caps[1]).ok()?;
        let name = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
        Some((code, name))
    }

    /// Finds the first station line on the page.
    ///
    /// The first match wins even when it is not a target: such pages belong
    /// to another station and are skipped.
    pub fn locate(&self, lines: &[&str], targets: &TargetStationSet) -> Option<LocatedStation> {
        let (line_index, (code, name)) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| self.parse_station_line(line).map(|found| (i, found)))?;

        if !targets.contains(code.as_str()) {
            tracing::debug!("Skipping page for non-target station {}", code);
            return None;
        }

        let region = lines
            .first()
            .filter(|first| self.region_heading.is_match(first))
            .map(|first| first.split_whitespace().collect::<Vec<_>>().join(" "));

        Some(LocatedStation {
            code,
            name,
            line_index,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> TargetStationSet {
        TargetStationSet::from_codes(["D22A093", "E22A054"]).unwrap()
    }

    #[test]
    fn test_station_line_splits_code_and_name() {
        let locator = StationLocator::new().unwrap();
        let (code, name) = locator
            .parse_station_line("D22A093 TURNASUYU CUMHURİYET KÖYÜ")
            .unwrap();
        assert_eq!(code.as_str(), "D22A093");
        assert_eq!(name, "TURNASUYU CUMHURİYET KÖYÜ");
    }

    #[test]
    fn test_every_valid_code_is_extracted_exactly() {
        let locator = StationLocator::new().unwrap();
        for code in ["D00A000", "E99A999", "D14A162", "E22A054"] {
            let line = format!("{}   SOME   RIVER  - STATION", code);
            let (found, name) = locator.parse_station_line(&line).unwrap();
            assert_eq!(found.as_str(), code);
            assert_eq!(name, "SOME RIVER - STATION");
        }
        assert!(locator.parse_station_line("X22A093 RIVER").is_none());
        assert!(locator.parse_station_line("D22A0931 RIVER").is_none());
        assert!(locator.parse_station_line("see D22A093").is_none());
    }

    #[test]
    fn test_locate_target_with_region() {
        let locator = StationLocator::new().unwrap();
        let text = "\n22 - MÜTEFERRİK DOĞU KARADENİZ SULARI\n\n  D22A093 TURNASUYU  CUMHURİYET KÖYÜ \nYAĞIŞ ALANI : 210,00 km2\n";
        let lines = page_lines(text);
        let found = locator.locate(&lines, &targets()).unwrap();

        assert_eq!(found.code.as_str(), "D22A093");
        assert_eq!(found.name, "TURNASUYU CUMHURİYET KÖYÜ");
        assert_eq!(found.line_index, 1);
        assert_eq!(
            found.region.as_deref(),
            Some("22 - MÜTEFERRİK DOĞU KARADENİZ SULARI")
        );
    }

    #[test]
    fn test_first_match_wins_even_if_not_target() {
        let locator = StationLocator::new().unwrap();
        let lines = page_lines("D14A011 OTHER STATION\nD22A093 TURNASUYU\n");
        assert!(locator.locate(&lines, &targets()).is_none());
    }

    #[test]
    fn test_page_without_station_is_skipped() {
        let locator = StationLocator::new().unwrap();
        let lines = page_lines("İÇİNDEKİLER\n14. Yesilirmak Havzasi ..... 12\n");
        assert!(locator.locate(&lines, &targets()).is_none());
    }
}
