//! Schema configuration errors
//!
//! A schema that is internally inconsistent cannot be used to validate or
//! chart anything. These errors must be fixed where the schema is authored.

use thiserror::Error;

/// Errors describing an inconsistent symptom schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Schema name is empty
    #[error("Schema name must not be empty")]
    EmptyName,

    /// A bound is NaN or infinite
    #[error("Schema '{schema}': {field} must be a finite number")]
    NonFiniteBound { schema: String, field: &'static str },

    /// min_value is greater than max_value
    #[error("Schema '{schema}': min_value {min} is greater than max_value {max}")]
    InvertedRange { schema: String, min: f64, max: f64 },

    /// ENUMERATION schema without options
    #[error("Schema '{schema}': enumeration requires at least one option")]
    MissingOptions { schema: String },
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
