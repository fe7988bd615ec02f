//! Observation Validator
//!
//! Decides whether a raw value is acceptable for a schema and produces the
//! normalized `ObservationValue`.
//!
//! | Data type   | Accepts                                      | Rejects with                  |
//! |-------------|----------------------------------------------|-------------------------------|
//! | NUMERIC     | finite number, inside bounds when present    | type_mismatch, out_of_range   |
//! | SCALE       | finite number, inside bounds (default 1-10)  | type_mismatch, out_of_range   |
//! | BOOLEAN     | true/false/1/0                               | type_mismatch                 |
//! | ENUMERATION | exact member of options                      | not_in_options, type_mismatch |
//! | TEXT        | string up to 1000 chars                      | out_of_range, type_mismatch   |
//! | IMAGE       | non-empty string                             | required, type_mismatch       |

use crate::observation::error::{ObservationResult, ValidationError};
use crate::observation::types::{ObservationValue, RawValue, NOTES_MAX_CHARS};
use crate::schema::{DataType, SymptomSchema};

const VALUE_FIELD: &str = "value";
const NOTES_FIELD: &str = "notes";

/// Validate a raw value against a schema
///
/// The schema is checked first; an inconsistent schema yields
/// `ObservationError::Configuration` regardless of the value.
pub fn validate_value(schema: &SymptomSchema, raw: &RawValue) -> ObservationResult<ObservationValue> {
    schema.check()?;

    let value = match schema.data_type {
        DataType::Numeric => ObservationValue::Numeric(validate_number(schema, raw)?),
        DataType::Scale => ObservationValue::Scale(validate_number(schema, raw)?),
        DataType::Boolean => ObservationValue::Boolean(coerce_bool(raw)?),
        DataType::Enumeration => ObservationValue::Enumeration(validate_option(schema, raw)?),
        DataType::Text => ObservationValue::Text(validate_text(raw)?),
        DataType::Image => ObservationValue::Image(validate_image(raw)?),
    };

    Ok(value)
}

/// Validate optional notes, dropping blank ones
pub fn validate_notes(notes: Option<&str>) -> Result<Option<String>, ValidationError> {
    let notes = match notes.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(n) => n,
    };

    if notes.chars().count() > NOTES_MAX_CHARS {
        return Err(ValidationError::out_of_range(
            NOTES_FIELD,
            format!("must be at most {} characters", NOTES_MAX_CHARS),
        ));
    }

    Ok(Some(notes.to_string()))
}

fn parse_number(raw: &RawValue) -> Result<f64, ValidationError> {
    let value = match raw {
        RawValue::Number(v) => *v,
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(ValidationError::required(VALUE_FIELD));
            }
            s.parse::<f64>().map_err(|_| {
                ValidationError::type_mismatch(VALUE_FIELD, format!("'{}' is not a number", s))
            })?
        }
        RawValue::Bool(_) => {
            return Err(ValidationError::type_mismatch(
                VALUE_FIELD,
                "expected a number, got boolean",
            ))
        }
    };

    if !value.is_finite() {
        return Err(ValidationError::type_mismatch(
            VALUE_FIELD,
            "expected a finite number",
        ));
    }

    Ok(value)
}

fn validate_number(schema: &SymptomSchema, raw: &RawValue) -> Result<f64, ValidationError> {
    let value = parse_number(raw)?;

    if let Some((min, max)) = schema.effective_bounds() {
        if let Some(min) = min {
            if value < min {
                return Err(range_error(value, min, max));
            }
        }
        if let Some(max) = max {
            if value > max {
                return Err(range_error(value, min.unwrap_or(f64::NEG_INFINITY), Some(max)));
            }
        }
    }

    Ok(value)
}

fn range_error(value: f64, min: f64, max: Option<f64>) -> ValidationError {
    let message = match max {
        Some(max) if min.is_finite() => format!("{} is outside {} to {}", value, min, max),
        Some(max) => format!("{} is above the maximum {}", value, max),
        None => format!("{} is below the minimum {}", value, min),
    };
    ValidationError::out_of_range(VALUE_FIELD, message)
}

fn coerce_bool(raw: &RawValue) -> Result<bool, ValidationError> {
    match raw {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Number(v) if *v == 1.0 => Ok(true),
        RawValue::Number(v) if *v == 0.0 => Ok(false),
        RawValue::Number(v) => Err(ValidationError::type_mismatch(
            VALUE_FIELD,
            format!("{} is not a boolean", v),
        )),
        RawValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "" => Err(ValidationError::required(VALUE_FIELD)),
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ValidationError::type_mismatch(
                VALUE_FIELD,
                format!("'{}' is not a boolean", other),
            )),
        },
    }
}

fn validate_option(schema: &SymptomSchema, raw: &RawValue) -> Result<String, ValidationError> {
    let s = match raw {
        RawValue::Text(s) => s,
        other => {
            return Err(ValidationError::type_mismatch(
                VALUE_FIELD,
                format!("expected one of the options, got {}", other.kind()),
            ))
        }
    };

    if schema.options.iter().any(|o| o == s) {
        Ok(s.clone())
    } else {
        Err(ValidationError::not_in_options(
            VALUE_FIELD,
            format!("'{}' is not one of: {}", s, schema.options.join(", ")),
        ))
    }
}

fn validate_text(raw: &RawValue) -> Result<String, ValidationError> {
    let s = match raw {
        RawValue::Text(s) => s,
        other => {
            return Err(ValidationError::type_mismatch(
                VALUE_FIELD,
                format!("expected text, got {}", other.kind()),
            ))
        }
    };

    if s.chars().count() > NOTES_MAX_CHARS {
        return Err(ValidationError::out_of_range(
            VALUE_FIELD,
            format!("must be at most {} characters", NOTES_MAX_CHARS),
        ));
    }

    Ok(s.clone())
}

fn validate_image(raw: &RawValue) -> Result<String, ValidationError> {
    match raw {
        RawValue::Text(s) if s.trim().is_empty() => Err(ValidationError::required(VALUE_FIELD)),
        RawValue::Text(s) => Ok(s.trim().to_string()),
        other => Err(ValidationError::type_mismatch(
            VALUE_FIELD,
            format!("expected an image reference, got {}", other.kind()),
        )),
    }
}
