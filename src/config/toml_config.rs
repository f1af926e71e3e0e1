use crate::core::{ConfigProvider, PostProcessOptions};
use crate::extract::assembler::DEFAULT_HEADER_WINDOW;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_dir: PathBuf,
    /// Empty or absent: every `dsi_<year>` file in `input_dir`.
    #[serde(default)]
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Empty or absent: the built-in station list.
    #[serde(default)]
    pub stations: Vec<String>,
    pub concurrent_files: Option<usize>,
    pub header_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub annual_averages: bool,
    #[serde(default)]
    pub correct_outliers: bool,
    #[serde(default)]
    pub fill_gaps: bool,
    pub reference_point: Option<ReferencePoint>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    /// `"compact"` (default) or `"json"`.
    pub log_format: Option<String>,
}

pub const DEFAULT_OUTPUT_FILE: &str = "dsi_station_records.csv";
pub const DEFAULT_CONCURRENT_FILES: usize = 4;

impl TomlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("source.input_dir", &self.source.input_dir.to_string_lossy())?;
        validation::validate_years("source.years", &self.source.years)?;
        validation::validate_station_codes("extract.stations", &self.extract.stations)?;

        if let Some(concurrent) = self.extract.concurrent_files {
            validation::validate_positive_number("extract.concurrent_files", concurrent, 1)?;
        }
        if let Some(window) = self.extract.header_window {
            validation::validate_header_window("extract.header_window", window)?;
        }
        if let Some(point) = self.transform.reference_point {
            validation::validate_reference_point(Some(point.latitude), Some(point.longitude))?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_extensions(
            "load.output_file",
            std::slice::from_ref(&self.output_file().to_string()),
            &["csv"],
        )?;

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|f| f == "json")
    }

    /// `debug` or `trace` in `monitoring.log_level` turns on verbose logging.
    pub fn verbose_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_level.as_deref())
            .is_some_and(|level| matches!(level, "debug" | "trace"))
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &Path {
        &self.source.input_dir
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_file(&self) -> &str {
        self.load.output_file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    fn years(&self) -> &[i32] {
        &self.source.years
    }

    fn target_stations(&self) -> &[String] {
        &self.extract.stations
    }

    fn concurrent_files(&self) -> usize {
        self.extract.concurrent_files.unwrap_or(DEFAULT_CONCURRENT_FILES)
    }

    fn header_window(&self) -> usize {
        self.extract.header_window.unwrap_or(DEFAULT_HEADER_WINDOW)
    }

    fn post_process(&self) -> PostProcessOptions {
        PostProcessOptions {
            annual_averages: self.transform.annual_averages,
            correct_outliers: self.transform.correct_outliers,
            fill_gaps: self.transform.fill_gaps,
            reference_point: self
                .transform
                .reference_point
                .map(|p| (p.latitude, p.longitude)),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "karadeniz-yearbooks"
description = "Doğu Karadeniz stations, 2000-2020"

[source]
input_dir = "./yearbooks"
years = [2005, 2006]

[extract]
stations = ["D22A093", "E22A054"]
concurrent_files = 2

[transform]
annual_averages = true
reference_point = { latitude = 41.0, longitude = 36.3 }

[load]
output_path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "karadeniz-yearbooks");
        assert_eq!(config.input_dir(), Path::new("./yearbooks"));
        assert_eq!(config.years(), &[2005, 2006]);
        assert_eq!(config.concurrent_files(), 2);
        assert_eq!(config.header_window(), 15);
        assert_eq!(config.output_file(), "dsi_station_records.csv");
        assert!(config.post_process().annual_averages);
        assert_eq!(config.post_process().reference_point, Some((41.0, 36.3)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[pipeline]
name = "all"

[source]
input_dir = "."

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.years().is_empty());
        assert!(config.target_stations().is_empty());
        assert_eq!(config.concurrent_files(), 4);
        assert!(!config.post_process().any());
        assert!(!config.monitoring_enabled());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DSI_TEST_YEARBOOK_DIR", "/data/dsi");

        let toml_content = r#"
[pipeline]
name = "test"

[source]
input_dir = "${DSI_TEST_YEARBOOK_DIR}"

[load]
output_path = "${DSI_TEST_UNSET_VARIABLE}/out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_dir(), Path::new("/data/dsi"));
        assert_eq!(config.output_path(), "${DSI_TEST_UNSET_VARIABLE}/out");

        std::env::remove_var("DSI_TEST_YEARBOOK_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[pipeline]
name = "test"

[source]
input_dir = "."

[extract]
stations = ["D22A093", "NOPE"]

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let bad_format = r#"
[pipeline]
name = "test"

[source]
input_dir = "."

[load]
output_path = "./output"
output_file = "records.csv"

[monitoring]
enabled = true
log_format = "xml"
"#;
        let config = TomlConfig::from_toml_str(bad_format).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[pipeline\nname = 1");
        assert!(matches!(result, Err(EtlError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[source]
input_dir = "./yearbooks"

[load]
output_path = "./output"

[monitoring]
enabled = true
log_level = "debug"
log_format = "json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
        assert!(config.verbose_logging());
    }
}
