use crate::domain::model::StationCode;
use crate::utils::error::{EtlError, Result};
use chrono::Datelike;
use std::collections::HashSet;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_HEADER_WINDOW: usize = 200;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[String], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Yearbook years run from 1900 to the current calendar year.
pub fn validate_years(field_name: &str, years: &[i32]) -> Result<()> {
    let current_year = chrono::Utc::now().year();
    for &year in years {
        validate_range(field_name, year, MIN_YEAR, current_year)?;
    }
    Ok(())
}

pub fn validate_station_codes(field_name: &str, codes: &[String]) -> Result<()> {
    for code in codes {
        if !StationCode::is_valid(code.trim()) {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: code.clone(),
                reason: "Station codes look like D22A093 ([DE], 2 digits, A, 3 digits)".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_header_window(field_name: &str, window: usize) -> Result<()> {
    validate_range(field_name, window, 1, MAX_HEADER_WINDOW)
}

/// A reference point needs both coordinates, each in range.
pub fn validate_reference_point(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<(f64, f64)>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            validate_range("reference_lat", lat, -90.0, 90.0)?;
            validate_range("reference_lon", lon, -180.0, 180.0)?;
            Ok(Some((lat, lon)))
        }
        (Some(_), None) => Err(EtlError::MissingConfigError {
            field: "reference_lon".to_string(),
        }),
        (None, Some(_)) => Err(EtlError::MissingConfigError {
            field: "reference_lat".to_string(),
        }),
    }
}
