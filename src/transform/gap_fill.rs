use super::{FillMethod, NumericField};
use crate::domain::model::StationRecord;
use std::collections::BTreeMap;

/// Linear interpolation by position between known neighbours.
/// Leading and trailing gaps are left for the edge fills.
fn interpolate(series: &mut [Option<f64>]) {
    let known: Vec<usize> = (0..series.len()).filter(|i| series[*i].is_some()).collect();
    for pair in known.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if let (Some(a), Some(b)) = (series[start], series[end]) {
            let span = (end - start) as f64;
            for (offset, slot) in series[start + 1..end].iter_mut().enumerate() {
                let step = (offset + 1) as f64;
                *slot = Some(a + (b - a) * step / span);
            }
        }
    }
}

fn forward_fill(series: &mut [Option<f64>]) {
    let mut last = None;
    for slot in series.iter_mut() {
        match slot {
            Some(value) => last = Some(*value),
            None => *slot = last,
        }
    }
}

fn backward_fill(series: &mut [Option<f64>]) {
    let mut next = None;
    for slot in series.iter_mut().rev() {
        match slot {
            Some(value) => next = Some(*value),
            None => *slot = next,
        }
    }
}

fn median(series: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = series.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    Some(if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    })
}

fn fill_series(series: &mut [Option<f64>], method: FillMethod) {
    match method {
        FillMethod::Interpolate => {
            interpolate(series);
            forward_fill(series);
            backward_fill(series);
        }
        FillMethod::CarryOver => {
            forward_fill(series);
            backward_fill(series);
        }
        FillMethod::StationMedian => {
            if let Some(median) = median(series) {
                for slot in series.iter_mut().filter(|s| s.is_none()) {
                    *slot = Some(median);
                }
            }
        }
    }
}

/// Fills missing numeric values using only the same station's other years.
///
/// Each station's records are taken in year order; stations with a single
/// record are left as they are. Returns how many values were filled per
/// station (stations with nothing to fill are omitted).
pub fn fill_gaps(records: &mut [StationRecord]) -> BTreeMap<String, usize> {
    let mut by_station: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        by_station
            .entry(record.station_code.to_string())
            .or_default()
            .push(i);
    }

    let fields = NumericField::all();
    let mut filled_per_station = BTreeMap::new();

    for (station, mut indices) in by_station {
        if indices.len() < 2 {
            tracing::debug!("{}: single record, gap filling skipped", station);
            continue;
        }
        indices.sort_by_key(|i| records[*i].year);

        let mut filled = 0;
        for field in &fields {
            let mut series: Vec<Option<f64>> =
                indices.iter().map(|i| field.get(&records[*i])).collect();
            let missing_before = series.iter().filter(|v| v.is_none()).count();
            if missing_before == 0 || missing_before == series.len() {
                continue;
            }

            fill_series(&mut series, field.fill_method());

            for (i, value) in indices.iter().zip(&series) {
                if field.get(&records[*i]).is_none() && value.is_some() {
                    field.set(&mut records[*i], *value);
                    if field.get(&records[*i]).is_some() {
                        filled += 1;
                    }
                }
            }
        }

        if filled > 0 {
            tracing::debug!("{}: {} values filled", station, filled);
            filled_per_station.insert(station, filled);
        }
    }

    filled_per_station
}
