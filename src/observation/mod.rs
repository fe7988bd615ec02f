//! Observations
//!
//! Recorded data points and the validator that admits them:
//!
//! - **types**: `RawValue` (boundary input), `ObservationValue` (normalized,
//!   tagged by data type) and `Observation`
//! - **validator**: per-type acceptance rules
//! - **error**: `ValidationError` and `ObservationError`
//!
//! # Write Path
//!
//! ```text
//! RawValue + SymptomSchema → check schema → per-type rule → ObservationValue
//! ```

pub mod error;
pub mod types;
pub mod validator;

pub use error::{ObservationError, ObservationResult, ValidationError, ValidationRule};
pub use types::{Observation, ObservationValue, RawValue, NOTES_MAX_CHARS};
pub use validator::{validate_notes, validate_value};
