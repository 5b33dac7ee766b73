//! Error types for the trendlens engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while shaping or analyzing a dataset.
///
/// Arithmetic edge cases (zero mean, zero variance, zero denominators) are not
/// represented here: analyzers recover from them locally with fixed fallback
/// values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The table does not have the shape the analyzers need.
    #[error("{0}")]
    Validation(String),

    /// A value in the date column could not be parsed.
    #[error("cannot parse '{value}' in column '{column}' (row {row}) as a date")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The requested column does not exist.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The requested column exists but is not numeric.
    #[error("column is not numeric: {0}")]
    NotNumeric(String),

    /// Model must be fitted before prediction.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Delimited text could not be read or written.
    #[error("csv error: {0}")]
    Csv(String),

    /// Configuration or record (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A persisted record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record store could not complete the operation.
    #[error("store error: {0}")]
    Store(String),
}

impl From<csv::Error> for AnalyticsError {
    fn from(err: csv::Error) -> Self {
        AnalyticsError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Serialization(err.to_string())
    }
}
