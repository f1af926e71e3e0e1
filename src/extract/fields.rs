//! One regex per header field. A field whose pattern does not match stays absent.

use crate::extract::numeric::parse_turkish_number;
use crate::utils::error::Result;
use regex::Regex;

const NUMBER: &str = r"\b\d[\d.]*(?:,\d+)?";

/// Totals printed on the `YILLIK TOPLAM AKIM` line under the monthly table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnnualTotals {
    pub total_flow_million_m3: Option<f64>,
    pub runoff_mm: Option<f64>,
    pub specific_flow_lt_sn_km2: Option<f64>,
}

pub struct FieldPatterns {
    catchment_area: Regex,
    elevation: Regex,
    observation_period: Regex,
    annual_avg_flow: Regex,
    annual_total_line: Regex,
    total_volume: Regex,
    total_runoff: Regex,
    total_specific: Regex,
}

impl FieldPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            catchment_area: Regex::new(&format!(
                r"(?i)ya[ğg][ıi][şs]\s*alan[ıi]\s*:?\s*({NUMBER})"
            ))?,
            elevation: Regex::new(&format!(
                r"(?i)yakla[şs][ıi]k\s*kot\s*:?\s*({NUMBER})"
            ))?,
            observation_period: Regex::new(
                r"(?i)g[öo]zlem\s*s[üu]res[iİı]\s*:?\s*(.+?)\s*(?:ortalama|$)",
            )?,
            annual_avg_flow: Regex::new(&format!(
                r"(?i)(?:(\d{{4}})\s*)?su\s*y[ıi]l[ıi]nda.*?({NUMBER})\s*m3\s*/\s*sn"
            ))?,
            annual_total_line: Regex::new(r"(?i)y[ıi]ll[ıi]k\s*toplam\s*ak[ıi]m")?,
            total_volume: Regex::new(&format!(r"(?i)({NUMBER})\s*m[İIıi]lyon\s*m3"))?,
            total_runoff: Regex::new(&format!(r"(?i)({NUMBER})\s*mm\.?(?:\s|$)"))?,
            total_specific: Regex::new(&format!(r"(?i)({NUMBER})\s*lt\s*/\s*sn\s*/\s*km2"))?,
        })
    }

    fn first_number(pattern: &Regex, lines: &[&str]) -> Option<f64> {
        lines.iter().find_map(|line| {
            pattern
                .captures(line)
                .and_then(|caps| parse_turkish_number(&caps[1]))
        })
    }

    /// `YAĞIŞ ALANI : 210,00 km2` → 210.0
    pub fn catchment_area(&self, lines: &[&str]) -> Option<f64> {
        Self::first_number(&self.catchment_area, lines)
    }

    /// `YAKLAŞIK KOT : 404 m` → 404.0
    pub fn elevation(&self, lines: &[&str]) -> Option<f64> {
        Self::first_number(&self.elevation, lines)
    }

    pub fn observation_period(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            self.observation_period
                .captures(line)
                .map(|caps| caps[1].trim().to_string())
                .filter(|period| !period.is_empty())
        })
    }

    /// `2005 Su yılında ortalama akım 4,87 m3/sn`.
    ///
    /// A line naming `year` wins; otherwise the first year-less match is used.
    pub fn annual_avg_flow(&self, lines: &[&str], year: i32) -> Option<f64> {
        let year_text = year.to_string();
        let matches: Vec<(Option<String>, Option<f64>)> = lines
            .iter()
            .filter_map(|line| self.annual_avg_flow.captures(line))
            .map(|caps| {
                (
                    caps.get(1).map(|m| m.as_str().to_string()),
                    parse_turkish_number(&caps[2]),
                )
            })
            .collect();

        matches
            .iter()
            .find(|(found_year, value)| {
                found_year.as_deref() == Some(year_text.as_str()) && value.is_some()
            })
            .or_else(|| {
                matches
                    .iter()
                    .find(|(found_year, value)| found_year.is_none() && value.is_some())
            })
            .and_then(|(_, value)| *value)
    }

    /// Reads the `YILLIK TOPLAM AKIM` line: labelled values first, then bare
    /// numbers in volume / runoff / specific-flow order.
    pub fn annual_totals(&self, lines: &[&str]) -> AnnualTotals {
        let Some(line) = lines
            .iter()
            .find(|line| self.annual_total_line.is_match(line))
        else {
            return AnnualTotals::default();
        };

        let labelled = |pattern: &Regex| {
            pattern
                .captures(line)
                .and_then(|caps| parse_turkish_number(&caps[1]))
        };
        let mut totals = AnnualTotals {
            total_flow_million_m3: labelled(&self.total_volume),
            runoff_mm: labelled(&self.total_runoff),
            specific_flow_lt_sn_km2: labelled(&self.total_specific),
        };

        if totals == AnnualTotals::default() {
            let after_label = self
                .annual_total_line
                .find(line)
                .map_or(*line, |m| &line[m.end()..]);
            let numbers: Vec<f64> = after_label
                .split_whitespace()
                .filter_map(parse_turkish_number)
                .collect();
            totals.total_flow_million_m3 = numbers.first().copied();
            totals.runoff_mm = numbers.get(1).copied();
            totals.specific_flow_lt_sn_km2 = numbers.get(2).copied();
        }

        totals
    }
}
