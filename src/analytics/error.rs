//! Analytics error types
//!
//! Empty series, a missing target or a zero baseline are not errors; they
//! produce defined results. Only malformed inputs end up here.

use thiserror::Error;

/// Errors that can occur in the analytics layer
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Time window could not be parsed or has start after end
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// Progress thresholds are inconsistent
    #[error("Invalid thresholds: moderate {moderate} must not exceed significant {significant}")]
    InvalidThresholds { moderate: f64, significant: f64 },

    /// Timeline zoom bounds are inconsistent
    #[error("Invalid zoom bounds: min {min} must be at least 1 and not exceed max {max}")]
    InvalidZoomBounds { min: u32, max: u32 },

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export buffer was not valid UTF-8
    #[error("Export encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::InvalidThresholds {
            moderate: 20.0,
            significant: 15.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid thresholds: moderate 20 must not exceed significant 15"
        );

        let err = AnalyticsError::InvalidWindow("fortnight".to_string());
        assert_eq!(err.to_string(), "Invalid time window: fortnight");
    }
}
