use crate::domain::model::{Metric, MonthlyTable};
use crate::extract::numeric::parse_cell;

/// Parses a summary row of the monthly flow table.
///
/// The row must start with one of the metric's labels. The first 12 cells
/// are October..September; the trailing yearly column is ignored and short
/// rows are padded with absent values. The label must be followed directly
/// by a cell, so heading lines that share a label word are not rows.
pub fn parse_monthly_row(line: &str) -> Option<(Metric, [Option<f64>; 12])> {
    let line = line.trim_start();
    let (metric, rest) = Metric::ALL.iter().find_map(|metric| {
        metric
            .labels()
            .iter()
            .find_map(|label| line.strip_prefix(label))
            .map(|rest| (*metric, rest))
    })?;

    // Cells run from right after the label to the first word that is not a
    // cell; a label followed by a word (`ORTALAMA AKIMLAR : ...`) is a header.
    let cells: Vec<Option<f64>> = rest
        .split_whitespace()
        .map_while(parse_cell)
        .take(12)
        .map(|cell| cell.into_value())
        .collect();
    if cells.is_empty() {
        return None;
    }

    let mut values = [None; 12];
    for (slot, value) in values.iter_mut().zip(cells) {
        *slot = value;
    }
    Some((metric, values))
}

/// Collects the six summary rows; the first row seen for a metric wins.
pub fn extract_monthly_table(lines: &[&str]) -> MonthlyTable {
    let mut table = MonthlyTable::default();
    let mut seen = [false; 6];

    for line in lines {
        if let Some((metric, values)) = parse_monthly_row(line) {
            if !seen[metric.index()] {
                seen[metric.index()] = true;
                table.set_row(metric, values);
            }
        }
    }

    let rows = seen.iter().filter(|s| **s).count();
    if rows < Metric::ALL.len() {
        tracing::debug!("Monthly table has {}/{} summary rows", rows, Metric::ALL.len());
    }
    table
}
