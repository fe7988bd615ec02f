//! Observation data types
//!
//! - `RawValue`: a value as it arrives from a form or API (string, number, boolean)
//! - `ObservationValue`: a validated value, one variant per `DataType`
//! - `Observation`: one recorded data point for a patient

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::DataType;

/// Maximum length of free text (notes and TEXT values), in characters
pub const NOTES_MAX_CHARS: usize = 1000;

/// A value as received at the boundary, before validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Short name of the raw shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
        }
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// A validated observation value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ObservationValue {
    Numeric(f64),
    Boolean(bool),
    Scale(f64),
    Enumeration(String),
    Text(String),
    /// Opaque stored-file identifier
    Image(String),
}

impl ObservationValue {
    /// The data type this value belongs to
    pub fn data_type(&self) -> DataType {
        match self {
            ObservationValue::Numeric(_) => DataType::Numeric,
            ObservationValue::Boolean(_) => DataType::Boolean,
            ObservationValue::Scale(_) => DataType::Scale,
            ObservationValue::Enumeration(_) => DataType::Enumeration,
            ObservationValue::Text(_) => DataType::Text,
            ObservationValue::Image(_) => DataType::Image,
        }
    }

    /// Numeric reading of the value; booleans read as 0 or 1
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ObservationValue::Numeric(v) | ObservationValue::Scale(v) => Some(*v),
            ObservationValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String content for string-typed values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ObservationValue::Enumeration(s)
            | ObservationValue::Text(s)
            | ObservationValue::Image(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationValue::Numeric(v) | ObservationValue::Scale(v) => write!(f, "{}", v),
            ObservationValue::Boolean(b) => write!(f, "{}", b),
            ObservationValue::Enumeration(s)
            | ObservationValue::Text(s)
            | ObservationValue::Image(s) => f.write_str(s),
        }
    }
}

/// One recorded data point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub plan_id: Uuid,
    pub schema_id: Uuid,
    /// Schema version the value was validated under
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub recorded_at: DateTime<Utc>,
    pub value: ObservationValue,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

impl Observation {
    /// Create an observation for a patient against a schema
    pub fn new(
        patient_id: Uuid,
        schema: &crate::schema::SymptomSchema,
        value: ObservationValue,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            plan_id: schema.plan_id,
            schema_id: schema.id,
            schema_version: schema.version,
            recorded_at,
            value,
            notes: None,
        }
    }

    /// Builder: attach notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SymptomSchema;

    #[test]
    fn test_raw_value_untagged_deserialize() {
        let v: RawValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, RawValue::Bool(true));
        let v: RawValue = serde_json::from_str("38.5").unwrap();
        assert_eq!(v, RawValue::Number(38.5));
        let v: RawValue = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(v, RawValue::Text("normal".to_string()));
    }

    #[test]
    fn test_value_numeric_reading() {
        assert_eq!(ObservationValue::Numeric(38.5).as_f64(), Some(38.5));
        assert_eq!(ObservationValue::Scale(4.0).as_f64(), Some(4.0));
        assert_eq!(ObservationValue::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(ObservationValue::Boolean(false).as_f64(), Some(0.0));
        assert_eq!(ObservationValue::Text("ok".into()).as_f64(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ObservationValue::Numeric(7.0).to_string(), "7");
        assert_eq!(ObservationValue::Scale(7.5).to_string(), "7.5");
        assert_eq!(ObservationValue::Boolean(false).to_string(), "false");
        assert_eq!(ObservationValue::Enumeration("low".into()).to_string(), "low");
    }

    #[test]
    fn test_observation_serialization() {
        let schema = SymptomSchema::new(Uuid::new_v4(), "Temp", "vitals", DataType::Numeric);
        let obs = Observation::new(
            Uuid::new_v4(),
            &schema,
            ObservationValue::Numeric(38.2),
            Utc::now(),
        )
        .notes("after walk");

        let json = serde_json::to_string(&obs).unwrap();
        assert!(json.contains("\"type\":\"numeric\""));
        let restored: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, restored);
        assert_eq!(restored.schema_id, schema.id);
        assert_eq!(restored.plan_id, schema.plan_id);
    }
}
