//! Observation error types
//!
//! A rejected value is the caller's input problem and is reported verbatim;
//! it is never retried. A broken schema is a configuration problem.

use serde::Serialize;
use thiserror::Error;

use crate::schema::SchemaError;

/// The rule a rejected value violated
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    OutOfRange,
    TypeMismatch,
    NotInOptions,
    Required,
}

impl ValidationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::OutOfRange => "out_of_range",
            ValidationRule::TypeMismatch => "type_mismatch",
            ValidationRule::NotInOptions => "not_in_options",
            ValidationRule::Required => "required",
        }
    }
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value failed one of its schema's rules
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{field}: {message} ({rule})")]
pub struct ValidationError {
    pub rule: ValidationRule,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(rule: ValidationRule, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationRule::OutOfRange, field, message)
    }

    pub fn type_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationRule::TypeMismatch, field, message)
    }

    pub fn not_in_options(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationRule::NotInOptions, field, message)
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(ValidationRule::Required, field, "a value is required")
    }
}

/// Errors from validating an observation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObservationError {
    /// The value broke a schema rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The schema itself is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(#[from] SchemaError),
}

impl ObservationError {
    /// The violated rule, when this is a value error
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            ObservationError::Validation(e) => Some(e.rule),
            ObservationError::Configuration(_) => None,
        }
    }
}

/// Result type alias for observation validation
pub type ObservationResult<T> = Result<T, ObservationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError::out_of_range("value", "must be between 1 and 10");
        assert_eq!(err.to_string(), "value: must be between 1 and 10 (out_of_range)");

        let err: ObservationError = ValidationError::required("value").into();
        assert_eq!(
            err.to_string(),
            "Validation error: value: a value is required (required)"
        );
        assert_eq!(err.rule(), Some(ValidationRule::Required));
    }

    #[test]
    fn test_rule_serializes_snake_case() {
        let json = serde_json::to_string(&ValidationRule::NotInOptions).unwrap();
        assert_eq!(json, "\"not_in_options\"");
    }
}
