//! Turkish-locale number normalization.
//!
//! Yearbook values use a decimal comma (`210,00`) and sometimes a dot as the
//! thousands separator (`1.234,56`). Monthly tables additionally carry `KURU`
//! for a dry month and runs of dashes for a missing observation.

/// One cell of a monthly flow table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Value(f64),
    /// `KURU`: the river was dry, i.e. zero flow.
    Dry,
    /// `-----`: no observation.
    Missing,
}

impl Cell {
    /// `Dry` is a literal zero; `Missing` stays absent.
    pub fn into_value(self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::Dry => Some(0.0),
            Cell::Missing => None,
        }
    }
}

/// Parses a number written with a decimal comma into an `f64`.
///
/// Returns `None` for anything that is not a plain number; header fields
/// treat that as absent.
pub fn parse_turkish_number(token: &str) -> Option<f64> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };

    let digits = normalized.strip_prefix('-').unwrap_or(&normalized);
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        || !digits.starts_with(|c: char| c.is_ascii_digit())
        || digits.matches('.').count() > 1
    {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classifies a whitespace-separated token of a monthly row.
///
/// Returns `None` when the token is not a table cell at all (stray words,
/// units), which ends a row.
pub fn parse_cell(token: &str) -> Option<Cell> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("KURU") {
        return Some(Cell::Dry);
    }
    if !token.is_empty() && token.chars().all(|c| c == '-' || c == '—' || c == '–') {
        return Some(Cell::Missing);
    }
    parse_turkish_number(token).map(Cell::Value)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
