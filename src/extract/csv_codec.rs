//! Fixed-layout CSV for station records.
//!
//! Absent values are empty cells. Floats use Rust's shortest round-trip
//! formatting, so reading a written file yields the same values.

use crate::domain::model::{
    annual_average_column, monthly_column, Coordinates, Metric, Month, StationCode, StationRecord,
};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;
use std::io::{Read, Write};

pub const HEADER_COLUMNS: [&str; 16] = [
    "station_code",
    "station_name",
    "year",
    "region",
    "catchment_area_km2",
    "elevation_m",
    "observation_period",
    "coordinates",
    "latitude",
    "longitude",
    "annual_avg_flow_m3s",
    "annual_total_flow_million_m3",
    "annual_runoff_mm",
    "annual_specific_flow_lt_sn_km2",
    "source_file",
    "page",
];

pub const DISTANCE_COLUMN: &str = "distance_km";

/// Column names in file order. Monthly columns are metric-major.
pub fn columns(include_annual_averages: bool, include_distance: bool) -> Vec<String> {
    let mut columns: Vec<String> = HEADER_COLUMNS.iter().map(|c| c.to_string()).collect();
    for metric in Metric::ALL {
        for month in Month::ALL {
            columns.push(monthly_column(metric, month));
        }
    }
    if include_annual_averages {
        columns.extend(Metric::ALL.iter().map(|m| annual_average_column(*m)));
    }
    if include_distance {
        columns.push(DISTANCE_COLUMN.to_string());
    }
    columns
}

fn float_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn record_row(record: &StationRecord, include_averages: bool, include_distance: bool) -> Vec<String> {
    let coordinates = record.coordinates.as_ref();
    let mut row = vec![
        record.station_code.to_string(),
        record.station_name.clone(),
        record.year.to_string(),
        record.region.clone().unwrap_or_default(),
        float_cell(record.catchment_area_km2),
        float_cell(record.elevation_m),
        record.observation_period.clone().unwrap_or_default(),
        coordinates.map(|c| c.raw.clone()).unwrap_or_default(),
        float_cell(coordinates.and_then(|c| c.latitude)),
        float_cell(coordinates.and_then(|c| c.longitude)),
        float_cell(record.annual_avg_flow_m3s),
        float_cell(record.annual_total_flow_million_m3),
        float_cell(record.annual_runoff_mm),
        float_cell(record.annual_specific_flow_lt_sn_km2),
        record.source_file.clone().unwrap_or_default(),
        record.page.map(|p| p.to_string()).unwrap_or_default(),
    ];
    for metric in Metric::ALL {
        row.extend(record.monthly.row(metric).iter().map(|v| float_cell(*v)));
    }
    if include_averages {
        let averages = record.annual_averages.unwrap_or_default();
        row.extend(averages.iter().map(|v| float_cell(*v)));
    }
    if include_distance {
        row.push(float_cell(record.distance_km));
    }
    row
}

/// Writes the header and one row per record.
///
/// The optional trailing columns appear when any record carries them.
pub fn write_records<W: Write>(writer: W, records: &[StationRecord]) -> Result<()> {
    let include_averages = records.iter().any(|r| r.annual_averages.is_some());
    let include_distance = records.iter().any(|r| r.distance_km.is_some());

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns(include_averages, include_distance))?;
    for record in records {
        csv_writer.write_record(record_row(record, include_averages, include_distance))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[StationRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    String::from_utf8(buffer)
        .map_err(|e| EtlError::processing(format!("CSV output is not UTF-8: {}", e)))
}

struct RowView<'a> {
    index: &'a HashMap<String, usize>,
    row: &'a csv::StringRecord,
    line: usize,
}

impl RowView<'_> {
    fn text(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .and_then(|i| self.row.get(*i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn string(&self, column: &str) -> Option<String> {
        self.text(column).map(str::to_string)
    }

    fn float(&self, column: &str) -> Result<Option<f64>> {
        self.text(column)
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    EtlError::validation(format!(
                        "line {}: '{}' in column {} is not a number",
                        self.line, value, column
                    ))
                })
            })
            .transpose()
    }

    fn required(&self, column: &str) -> Result<&str> {
        self.text(column).ok_or_else(|| {
            EtlError::validation(format!("line {}: column {} is empty", self.line, column))
        })
    }
}

/// Reads a file produced by [`write_records`]. Columns are matched by header name.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<StationRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let index: HashMap<String, usize> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    for column in ["station_code", "year"] {
        if !index.contains_key(column) {
            return Err(EtlError::validation(format!(
                "CSV header has no '{}' column",
                column
            )));
        }
    }
    let has_averages = Metric::ALL
        .iter()
        .any(|m| index.contains_key(&annual_average_column(*m)));

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        let row = row?;
        let view = RowView {
            index: &index,
            row: &row,
            line: i + 2,
        };

        let code = StationCode::parse(view.required("station_code")?)?;
        let year_text = view.required("year")?;
        let year = year_text.parse::<i32>().map_err(|_| {
            EtlError::validation(format!("line {}: '{}' is not a year", view.line, year_text))
        })?;

        let mut record =
            StationRecord::new(code, view.string("station_name").unwrap_or_default(), year);
        record.region = view.string("region");
        record.catchment_area_km2 = view.float("catchment_area_km2")?;
        record.elevation_m = view.float("elevation_m")?;
        record.observation_period = view.string("observation_period");

        let raw = view.string("coordinates");
        let latitude = view.float("latitude")?;
        let longitude = view.float("longitude")?;
        if raw.is_some() || latitude.is_some() || longitude.is_some() {
            record.coordinates = Some(Coordinates {
                raw: raw.unwrap_or_default(),
                latitude,
                longitude,
            });
        }

        record.annual_avg_flow_m3s = view.float("annual_avg_flow_m3s")?;
        record.annual_total_flow_million_m3 = view.float("annual_total_flow_million_m3")?;
        record.annual_runoff_mm = view.float("annual_runoff_mm")?;
        record.annual_specific_flow_lt_sn_km2 = view.float("annual_specific_flow_lt_sn_km2")?;
        record.source_file = view.string("source_file");
        record.page = view
            .text("page")
            .map(|p| {
                p.parse::<usize>().map_err(|_| {
                    EtlError::validation(format!("line {}: '{}' is not a page", view.line, p))
                })
            })
            .transpose()?;

        for metric in Metric::ALL {
            for month in Month::ALL {
                record
                    .monthly
                    .set(metric, month, view.float(&monthly_column(metric, month))?);
            }
        }

        if has_averages {
            let mut averages = [None; 6];
            for metric in Metric::ALL {
                averages[metric.index()] = view.float(&annual_average_column(metric))?;
            }
            record.annual_averages = Some(averages);
        }
        record.distance_km = view.float(DISTANCE_COLUMN)?;

        records.push(record);
    }

    tracing::debug!("Read {} records from CSV", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StationRecord {
        let mut record =
            StationRecord::new(StationCode::parse("D22A093").unwrap(), "TURNASUYU, KÖYÜ", 2005);
        record.region = Some("22 - DOĞU KARADENİZ SULARI".to_string());
        record.catchment_area_km2 = Some(210.0);
        record.coordinates = Some(Coordinates {
            raw: "37°53'10\" Doğu - 40°58'20\" Kuzey".to_string(),
            latitude: Some(40.97222222222222),
            longitude: Some(37.88611111111111),
        });
        record.annual_avg_flow_m3s = Some(4.87);
        record.source_file = Some("dsi_2005.pdf".to_string());
        record.page = Some(12);
        record.monthly.set(Metric::FlowMax, Month::Oct, Some(0.54));
        record.monthly.set(Metric::FlowMax, Month::Jan, Some(0.0));
        record.monthly.set(Metric::VolumeMilM3, Month::Sep, Some(1.04));
        record
    }

    #[test]
    fn test_column_layout() {
        let base = columns(false, false);
        assert_eq!(base.len(), 16 + 72);
        assert_eq!(base[0], "station_code");
        assert_eq!(base[16], "oct_flow_max");
        assert_eq!(base[27], "sep_flow_max");
        assert_eq!(base[28], "oct_flow_min");
        assert_eq!(base.last().unwrap(), "sep_mil_m3");

        let full = columns(true, true);
        assert_eq!(full.len(), 16 + 72 + 7);
        assert_eq!(full[88], "annual_average_flow_max");
        assert_eq!(full.last().unwrap(), "distance_km");
    }

    #[test]
    fn test_absent_values_are_empty_cells() {
        let record = StationRecord::new(StationCode::parse("E22A054").unwrap(), "X", 2010);
        let csv = to_csv_string(&[record]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("E22A054,X,2010,,,"));
        assert_eq!(row.split(',').count(), 88);
    }

    #[test]
    fn test_write_then_read_preserves_values() {
        let mut second = sample();
        second.year = 2006;
        second.annual_averages = Some([Some(1.25), None, None, None, None, Some(3.0)]);
        second.distance_km = Some(12.5);
        let records = vec![sample(), second];

        let csv = to_csv_string(&records).unwrap();
        let back = read_records(csv.as_bytes()).unwrap();

        assert_eq!(back[1], records[1]);
        // The first record gains an all-empty averages block from the shared header.
        assert_eq!(back[0].annual_averages, Some([None; 6]));
        assert_eq!(back[0].monthly, records[0].monthly);
        assert_eq!(back[0].coordinates, records[0].coordinates);
        assert_eq!(back[0].station_name, "TURNASUYU, KÖYÜ");
    }

    #[test]
    fn test_read_rejects_bad_numbers() {
        let mut csv = to_csv_string(&[sample()]).unwrap();
        csv = csv.replace(",210,", ",abc,");
        assert!(read_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_requires_key_columns() {
        assert!(read_records("station_name,year\nX,2005\n".as_bytes()).is_err());
    }
}
