use super::NumericField;
use crate::domain::model::{ColumnCorrection, StationRecord};
use crate::extract::numeric::round2;

const MIN_VALUES: usize = 4;
const STD_DEVS: f64 = 3.0;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Replaces values outside `mean ± 3·std` with the column median.
///
/// Statistics are taken across all records. Columns with fewer than four
/// present values are skipped. Only columns that had outliers are logged.
pub fn correct_outliers(records: &mut [StationRecord]) -> Vec<ColumnCorrection> {
    let mut corrections = Vec::new();

    for field in NumericField::outlier_candidates() {
        let values: Vec<f64> = records.iter().filter_map(|r| field.get(r)).collect();
        if values.len() < MIN_VALUES {
            continue;
        }

        let mean = mean(&values);
        let std_dev = sample_std(&values, mean);
        let median = median(&values);
        let lower = mean - STD_DEVS * std_dev;
        let upper = mean + STD_DEVS * std_dev;
        let replacement = round2(median);

        let mut found = 0;
        for record in records.iter_mut() {
            if let Some(value) = field.get(record) {
                if value < lower || value > upper {
                    field.set(record, Some(replacement));
                    found += 1;
                }
            }
        }

        if found > 0 {
            tracing::debug!(
                "{}: {} outliers outside [{:.2}, {:.2}] set to {}",
                field.name(),
                found,
                lower,
                upper,
                replacement
            );
            corrections.push(ColumnCorrection {
                column: field.name(),
                outliers_found: found,
                lower_bound: round2(lower),
                upper_bound: round2(upper),
                mean: round2(mean),
                std_dev: round2(std_dev),
                median_replacement: replacement,
            });
        }
    }

    corrections
}
