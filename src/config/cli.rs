use crate::core::{ConfigProvider, PostProcessOptions};
use crate::extract::assembler::DEFAULT_HEADER_WINDOW;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_header_window, validate_path, validate_positive_number,
    validate_reference_point, validate_station_codes, validate_years, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dsi-flow-etl")]
#[command(about = "Extract DSİ streamflow yearbook station pages into a CSV")]
pub struct CliConfig {
    /// Single yearbook year (same as --years <YEAR>)
    pub year: Option<i32>,

    #[arg(long, value_delimiter = ',', help = "Yearbook years to process; all dsi_<year> files if omitted")]
    pub years: Vec<i32>,

    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "dsi_station_records.csv")]
    pub output_file: String,

    #[arg(long, value_delimiter = ',', help = "Station codes to extract; built-in list if omitted")]
    pub stations: Vec<String>,

    #[arg(long, default_value = "4")]
    pub concurrent_files: usize,

    #[arg(long, default_value_t = DEFAULT_HEADER_WINDOW, help = "Lines after the station line searched for header fields")]
    pub header_window: usize,

    #[arg(long, help = "Add annual_average_<metric> columns")]
    pub annual_averages: bool,

    #[arg(long, help = "Replace values outside mean ± 3 std with the column median")]
    pub correct_outliers: bool,

    #[arg(long, help = "Fill missing values from the same station's other years")]
    pub fill_gaps: bool,

    #[arg(long, allow_hyphen_values = true, help = "Reference latitude for distance_km")]
    pub reference_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, help = "Reference longitude for distance_km")]
    pub reference_lon: Option<f64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,
}

impl CliConfig {
    /// Folds the positional year into `years` and tidies station codes.
    pub fn normalize(mut self) -> Self {
        if let Some(year) = self.year.take() {
            self.years.push(year);
        }
        self.years.sort_unstable();
        self.years.dedup();
        self.stations = self
            .stations
            .iter()
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        self
    }
}

impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn years(&self) -> &[i32] {
        &self.years
    }

    fn target_stations(&self) -> &[String] {
        &self.stations
    }

    fn concurrent_files(&self) -> usize {
        self.concurrent_files
    }

    fn header_window(&self) -> usize {
        self.header_window
    }

    fn post_process(&self) -> PostProcessOptions {
        PostProcessOptions {
            annual_averages: self.annual_averages,
            correct_outliers: self.correct_outliers,
            fill_gaps: self.fill_gaps,
            reference_point: self.reference_lat.zip(self.reference_lon),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir.to_string_lossy())?;
        validate_path("output_path", &self.output_path)?;
        validate_file_extensions("output_file", std::slice::from_ref(&self.output_file), &["csv"])?;
        let mut years = self.years.clone();
        years.extend(self.year);
        validate_years("years", &years)?;
        validate_station_codes("stations", &self.stations)?;
        validate_positive_number("concurrent_files", self.concurrent_files, 1)?;
        validate_header_window("header_window", self.header_window)?;
        validate_reference_point(self.reference_lat, self.reference_lon)?;
        Ok(())
    }
}
