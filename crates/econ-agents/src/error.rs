//! Error types for economic analysis operations

use thiserror::Error;

/// Economic analysis specific errors
#[derive(Debug, Error)]
pub enum EconError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// No usable data for an agent or series
    #[error("Data not available for {subject}: {reason}")]
    DataUnavailable { subject: String, reason: String },

    /// Series violated the strictly-increasing date invariant
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Unknown domain name
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV encoding error while exporting collected data
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Filesystem error while writing artifacts
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for economic analysis operations
pub type Result<T> = std::result::Result<T, EconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EconError::UnknownDomain("housing".to_string());
        assert_eq!(err.to_string(), "Unknown domain: housing");

        let err = EconError::DataUnavailable {
            subject: "TradeAgent".to_string(),
            reason: "no series collected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for TradeAgent: no series collected"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EconError = io.into();
        assert!(matches!(err, EconError::IoError(_)));
    }
}
