//! Error types for the rate-shock risk pipeline

use thiserror::Error;

/// Errors raised while validating inputs or running the pipeline.
///
/// Numeric edge cases (non-positive equity, zero aggregation weight) are
/// never errors; they resolve to defined fallback values.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Malformed configuration or an input value outside its domain
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// A required field is absent, or a join key has no matching record
    #[error("missing field `{field}` for institution `{institution}`")]
    MissingField { institution: String, field: String },

    /// CSV read/write failure at the I/O boundary
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure at the I/O boundary
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be decoded
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RiskError {
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        RiskError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(institution: impl Into<String>, field: impl Into<String>) -> Self {
        RiskError::MissingField {
            institution: institution.into(),
            field: field.into(),
        }
    }

    /// Short name of the error kind, surfaced by the command-line shell
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::InvalidParameter { .. } => "InvalidParameterError",
            RiskError::MissingField { .. } => "MissingFieldError",
            RiskError::Csv(_) => "CsvError",
            RiskError::Io(_) => "IoError",
            RiskError::Config(_) => "ConfigError",
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RiskError>;
