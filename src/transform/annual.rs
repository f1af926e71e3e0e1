use crate::domain::model::{Metric, MonthlyTable, StationRecord};
use crate::extract::numeric::round2;

/// Mean of the present months per metric, rounded to two decimals.
pub fn annual_averages(table: &MonthlyTable) -> [Option<f64>; 6] {
    let mut averages = [None; 6];
    for metric in Metric::ALL {
        let present: Vec<f64> = table.row(metric).iter().flatten().copied().collect();
        if !present.is_empty() {
            averages[metric.index()] = Some(round2(present.iter().sum::<f64>() / present.len() as f64));
        }
    }
    averages
}

pub fn compute_annual_averages(records: &mut [StationRecord]) {
    for record in records {
        record.annual_averages = Some(annual_averages(&record.monthly));
    }
}
