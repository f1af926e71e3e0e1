//! Post-processing applied to extracted records before they are written.

pub mod annual;
pub mod distance;
pub mod gap_fill;
pub mod outliers;

use crate::domain::model::{annual_average_column, monthly_column, ColumnCorrection, Metric, Month, StationRecord};
use crate::domain::ports::PostProcessOptions;
use std::collections::BTreeMap;

pub use annual::{annual_averages, compute_annual_averages};
pub use distance::{apply_distances, haversine_km};
pub use gap_fill::fill_gaps;
pub use outliers::correct_outliers;

/// How gap filling treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// Linear interpolation by position, then forward and backward fill.
    Interpolate,
    /// Forward fill, then backward fill.
    CarryOver,
    /// Median of the station's present values.
    StationMedian,
}

/// A numeric column of a [`StationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    CatchmentArea,
    Elevation,
    AnnualAvgFlow,
    AnnualTotalFlow,
    AnnualRunoff,
    AnnualSpecificFlow,
    Monthly(Metric, Month),
    AnnualAverage(Metric),
}

impl NumericField {
    pub fn all() -> Vec<NumericField> {
        let mut fields = vec![
            NumericField::CatchmentArea,
            NumericField::Elevation,
            NumericField::AnnualAvgFlow,
            NumericField::AnnualTotalFlow,
            NumericField::AnnualRunoff,
            NumericField::AnnualSpecificFlow,
        ];
        for metric in Metric::ALL {
            fields.extend(Month::ALL.iter().map(|m| NumericField::Monthly(metric, *m)));
        }
        fields.extend(Metric::ALL.iter().map(|m| NumericField::AnnualAverage(*m)));
        fields
    }

    /// Columns screened for outliers. Elevation is a site constant and is left alone.
    pub fn outlier_candidates() -> Vec<NumericField> {
        Self::all()
            .into_iter()
            .filter(|f| *f != NumericField::Elevation)
            .collect()
    }

    pub fn name(self) -> String {
        match self {
            NumericField::CatchmentArea => "catchment_area_km2".to_string(),
            NumericField::Elevation => "elevation_m".to_string(),
            NumericField::AnnualAvgFlow => "annual_avg_flow_m3s".to_string(),
            NumericField::AnnualTotalFlow => "annual_total_flow_million_m3".to_string(),
            NumericField::AnnualRunoff => "annual_runoff_mm".to_string(),
            NumericField::AnnualSpecificFlow => "annual_specific_flow_lt_sn_km2".to_string(),
            NumericField::Monthly(metric, month) => monthly_column(metric, month),
            NumericField::AnnualAverage(metric) => annual_average_column(metric),
        }
    }

    pub fn fill_method(self) -> FillMethod {
        match self {
            NumericField::AnnualAvgFlow
            | NumericField::AnnualTotalFlow
            | NumericField::AnnualRunoff
            | NumericField::AnnualSpecificFlow => FillMethod::Interpolate,
            NumericField::Monthly(..) | NumericField::AnnualAverage(_) => FillMethod::CarryOver,
            NumericField::CatchmentArea | NumericField::Elevation => FillMethod::StationMedian,
        }
    }

    pub fn get(self, record: &StationRecord) -> Option<f64> {
        match self {
            NumericField::CatchmentArea => record.catchment_area_km2,
            NumericField::Elevation => record.elevation_m,
            NumericField::AnnualAvgFlow => record.annual_avg_flow_m3s,
            NumericField::AnnualTotalFlow => record.annual_total_flow_million_m3,
            NumericField::AnnualRunoff => record.annual_runoff_mm,
            NumericField::AnnualSpecificFlow => record.annual_specific_flow_lt_sn_km2,
            NumericField::Monthly(metric, month) => record.monthly.get(metric, month),
            NumericField::AnnualAverage(metric) => {
                record.annual_averages.and_then(|a| a[metric.index()])
            }
        }
    }

    pub fn set(self, record: &mut StationRecord, value: Option<f64>) {
        match self {
            NumericField::CatchmentArea => record.catchment_area_km2 = value,
            NumericField::Elevation => record.elevation_m = value,
            NumericField::AnnualAvgFlow => record.annual_avg_flow_m3s = value,
            NumericField::AnnualTotalFlow => record.annual_total_flow_million_m3 = value,
            NumericField::AnnualRunoff => record.annual_runoff_mm = value,
            NumericField::AnnualSpecificFlow => record.annual_specific_flow_lt_sn_km2 = value,
            NumericField::Monthly(metric, month) => record.monthly.set(metric, month, value),
            NumericField::AnnualAverage(metric) => {
                // Averages that were never computed stay uncomputed.
                if let Some(averages) = record.annual_averages.as_mut() {
                    averages[metric.index()] = value;
                }
            }
        }
    }
}

/// What the post-processing steps changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostProcessSummary {
    pub corrections: Vec<ColumnCorrection>,
    pub filled_per_station: BTreeMap<String, usize>,
    pub distances_computed: usize,
}

/// Runs the enabled steps in order: averages, outliers, gap filling, distance.
pub fn post_process(records: &mut [StationRecord], options: &PostProcessOptions) -> PostProcessSummary {
    let mut summary = PostProcessSummary::default();

    if options.annual_averages {
        compute_annual_averages(records);
        tracing::info!("📐 Annual averages computed for {} records", records.len());
    }

    if options.correct_outliers {
        summary.corrections = correct_outliers(records);
        let replaced: usize = summary.corrections.iter().map(|c| c.outliers_found).sum();
        tracing::info!(
            "🧹 Outlier correction: {} values replaced across {} columns",
            replaced,
            summary.corrections.len()
        );
    }

    if options.fill_gaps {
        summary.filled_per_station = fill_gaps(records);
        let filled: usize = summary.filled_per_station.values().sum();
        tracing::info!(
            "🩹 Gap filling: {} values filled across {} stations",
            filled,
            summary.filled_per_station.len()
        );
    }

    if let Some(reference) = options.reference_point {
        summary.distances_computed = apply_distances(records, reference);
        tracing::info!(
            "📏 Distances from ({:.4}, {:.4}) computed for {} records",
            reference.0,
            reference.1,
            summary.distances_computed
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StationCode;

    #[test]
    fn test_field_names_match_csv_columns() {
        let names: Vec<String> = NumericField::all().iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), 6 + 72 + 6);
        assert_eq!(names[6], "oct_flow_max");
        assert!(names.contains(&"annual_average_mil_m3".to_string()));
        assert!(!NumericField::outlier_candidates().contains(&NumericField::Elevation));
    }

    #[test]
    fn test_annual_average_set_needs_computed_block() {
        let mut record = StationRecord::new(StationCode::parse("D22A093").unwrap(), "", 2005);
        let field = NumericField::AnnualAverage(Metric::FlowAvg);
        field.set(&mut record, Some(1.0));
        assert_eq!(field.get(&record), None);

        record.annual_averages = Some([None; 6]);
        field.set(&mut record, Some(1.0));
        assert_eq!(field.get(&record), Some(1.0));
    }

    #[test]
    fn test_post_process_with_nothing_enabled_is_a_no_op() {
        let mut records = vec![StationRecord::new(StationCode::parse("D22A093").unwrap(), "", 2005)];
        let before = records.clone();
        let summary = post_process(&mut records, &PostProcessOptions::default());
        assert_eq!(records, before);
        assert_eq!(summary, PostProcessSummary::default());
    }
}
