use thiserror::Error;

#[derive(Error, Debug)]
pub enum SquirrelError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("No product named '{name}' is offered near the start place (available: {})", .available.join(", "))]
    ProductNotFound { name: String, available: Vec<String> },

    #[error("Could not resolve address '{address}': {reason}")]
    ResolutionError { address: String, reason: String },

    #[error("Estimate request failed: {message}")]
    EstimateError { message: String },

    #[error("Row has {actual} fields but the header has {expected}")]
    RecordShapeError { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Resolution,
    Estimate,
    Storage,
}

impl SquirrelError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn estimate(message: impl Into<String>) -> Self {
        Self::EstimateError {
            message: message.into(),
        }
    }

    pub fn resolution(address: &str, reason: impl Into<String>) -> Self {
        Self::ResolutionError {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ProductNotFound { .. } => ErrorCategory::Configuration,
            Self::ResolutionError { .. } => ErrorCategory::Resolution,
            Self::EstimateError { .. } => ErrorCategory::Estimate,
            Self::CsvError(_) | Self::IoError(_) | Self::RecordShapeError { .. } => {
                ErrorCategory::Storage
            }
        }
    }

    /// 依錯誤類別決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Storage => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Resolution => 3,
            ErrorCategory::Estimate => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ProductNotFound { .. } => {
                "Set ride.product_name to one of the display names offered in your city"
            }
            Self::ResolutionError { .. } => {
                "Check the address spelling, the geocoder API key and network connectivity"
            }
            Self::EstimateError { .. } => {
                "Check that the ride API is reachable and the access token has the right scopes"
            }
            _ => match self.category() {
                ErrorCategory::Configuration => {
                    "Review the configuration file and the environment variables it references"
                }
                ErrorCategory::Storage => {
                    "Make sure the output path is writable and points at a consistent CSV log"
                }
                _ => "Re-run with --verbose for more details",
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SquirrelError>;
