use crate::qif::QifError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("QIF error: {0}")]
    QifError(#[from] QifError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Row {line} rejected: {reason}")]
    InvalidRowError { line: usize, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Source returned HTTP {status} for {url}")]
    SourceUnavailable { url: String, status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::SourceUnavailable { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::QifError(_)
            | EtlError::InvalidRowError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingConfigError { .. } => "Add the missing field to the TOML file or pass it on the command line",
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Check the configuration value against the documented options"
            }
            EtlError::ConfigError { .. } => "Review the configuration file for typos",
            EtlError::ApiError(_) | EtlError::SourceUnavailable { .. } => {
                "Check network connectivity and the source URL, then retry"
            }
            EtlError::CsvError(_) => "Check the CSV delimiter and that every row has the same number of columns",
            EtlError::InvalidRowError { .. } => {
                "Fix the row, adjust the field mapping, or set error_handling.on_invalid_row = \"skip\""
            }
            EtlError::QifError(QifError::InvalidAmount { .. }) => {
                "Check the amount column and the decimal_separator setting"
            }
            EtlError::QifError(_) | EtlError::ProcessingError { .. } => {
                "Review the statement data and the field mapping"
            }
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check that the input exists and the output directory is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not fetch the statement: {}", self),
            ErrorCategory::Data => format!("Could not convert the statement: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
        }
    }

    /// 根據嚴重程度決定 CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
