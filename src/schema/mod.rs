//! Symptom Schemas
//!
//! The typed vocabulary a monitoring plan is built from:
//!
//! - **types**: `DataType`, `TypeRequirements` and `SymptomSchema`
//! - **error**: `SchemaError`, raised at schema-authoring time
//!
//! # Example
//!
//! ```rust
//! use vetwatch::schema::{DataType, SymptomSchema};
//! use uuid::Uuid;
//!
//! let pain = SymptomSchema::new(Uuid::new_v4(), "Pain score", "pain", DataType::Scale)
//!     .range(0.0, 10.0);
//! assert!(pain.check().is_ok());
//! assert_eq!(pain.effective_bounds(), Some((Some(0.0), Some(10.0))));
//! ```

pub mod error;
pub mod types;

pub use error::{SchemaError, SchemaResult};
pub use types::{describe, DataType, SchemaRevision, SymptomSchema, TypeRequirements};
