//! Store and service error types

use thiserror::Error;
use uuid::Uuid;

use crate::analytics::AnalyticsError;
use crate::observation::{ObservationError, ValidationError};
use crate::schema::SchemaError;

/// Errors that can occur in the monitoring store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Schema rejected at authoring time
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by `MonitoringService`
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Value rejected by its schema; report to the user, do not retry
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Schema is inconsistent and must be fixed where it is authored
    #[error("Configuration error: {0}")]
    Configuration(#[from] SchemaError),

    /// Requested schema does not exist
    #[error("Symptom schema not found: {0}")]
    SchemaNotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl From<ObservationError> for ServiceError {
    fn from(err: ObservationError) -> Self {
        match err {
            ObservationError::Validation(e) => ServiceError::Validation(e),
            ObservationError::Configuration(e) => ServiceError::Configuration(e),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        let err = ServiceError::SchemaNotFound(id);
        assert_eq!(
            err.to_string(),
            "Symptom schema not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_observation_error_conversion() {
        let err: ServiceError =
            ObservationError::Validation(ValidationError::required("value")).into();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err: ServiceError = ObservationError::Configuration(SchemaError::EmptyName).into();
        assert!(matches!(err, ServiceError::Configuration(SchemaError::EmptyName)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}
