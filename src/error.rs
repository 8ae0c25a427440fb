//! Error types for the PITCH sales tracker.
//!
//! Business-rule rejections (duplicate adds, overdrafts, stale events) are
//! *not* errors: they are reported as [`Failure`](crate::types::Failure)
//! values. `PitchError` covers everything the handling core does not
//! recover from: undecodable records, I/O and export problems.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, PitchError>;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum PitchError {
    /// A record does not match the configured fixed-width layout
    #[error("Malformed record ({reason}): {record:?}")]
    MalformedRecord { reason: String, record: String },

    /// Invalid layout or tracker configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O failure (reading a feed, writing an export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PitchError {
    /// Create a malformed-record error.
    pub fn malformed(reason: impl Into<String>, record: &str) -> Self {
        PitchError::MalformedRecord {
            reason: reason.into(),
            record: record.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        PitchError::Config(msg.into())
    }

    /// Whether this error is a per-record decoding defect (skippable).
    pub fn is_malformed(&self) -> bool {
        matches!(self, PitchError::MalformedRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PitchError::malformed("timestamp is not decimal", "1111x111A");
        assert_eq!(
            err.to_string(),
            "Malformed record (timestamp is not decimal): \"1111x111A\""
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PitchError = io.into();
        assert!(matches!(err, PitchError::Io(_)));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_result_type() {
        let result: Result<u32> = Err(PitchError::config("empty range"));
        assert!(result.is_err());
    }
}
