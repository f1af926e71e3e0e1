use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    #[error("Failed to read PDF '{path}': {message}")]
    PdfError { path: String, message: String },

    #[error("Cannot derive a year from file name '{name}'")]
    InvalidFileName { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No station records extracted: {message}")]
    NoRecords { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Parsing,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn pdf(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PdfError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputNotFound { .. } | Self::InvalidFileName { .. } => ErrorCategory::Input,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::PdfError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Parsing,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::RegexError(_) => ErrorCategory::Configuration,
            Self::ProcessingError { .. } | Self::NoRecords { .. } => ErrorCategory::Processing,
            Self::IoError(_) | Self::TaskError(_) => ErrorCategory::System,
        }
    }

    /// Drives the process exit code: Low exits 0, Medium 2, High 1, Critical 3.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoRecords { .. } => ErrorSeverity::Low,
            Self::IoError(_) | Self::TaskError(_) => ErrorSeverity::Medium,
            Self::InputNotFound { .. }
            | Self::InvalidFileName { .. }
            | Self::PdfError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. }
            | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::RegexError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => {
                "Check --input-dir and that yearbooks are named dsi_<year>.pdf"
            }
            Self::InvalidFileName { .. } => "Rename the yearbook to dsi_<year>.pdf",
            Self::PdfError { .. } => {
                "Convert the yearbook with `pdftotext` and pass the .txt file instead"
            }
            Self::CsvError(_) => "Make sure the CSV was written by this tool and is not truncated",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration value and rerun",
            Self::NoRecords { .. } => {
                "Check the target station list; none of its stations appeared in the input pages"
            }
            Self::IoError(_) | Self::TaskError(_) => "Retry; check disk space and permissions",
            _ => "Run again with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputNotFound { path } => format!("Input file not found: {}", path),
            Self::NoRecords { .. } => {
                "No station records were extracted; no CSV file was written".to_string()
            }
            Self::PdfError { path, .. } => format!("Could not read text from {}", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
