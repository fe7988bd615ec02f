//! Core schema types
//!
//! - `DataType`: the kind of value a symptom records
//! - `TypeRequirements`: which configuration fields a data type needs
//! - `SymptomSchema`: the full definition of a monitored symptom

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::error::{SchemaError, SchemaResult};

/// Default lower bound for SCALE schemas without an explicit minimum
pub const DEFAULT_SCALE_MIN: f64 = 1.0;

/// Default upper bound for SCALE schemas without an explicit maximum
pub const DEFAULT_SCALE_MAX: f64 = 10.0;

/// The kind of value recorded against a symptom
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Free numeric measurement (temperature, weight)
    Numeric,
    /// Yes/no observation (vomiting, lameness)
    Boolean,
    /// Bounded rating (pain 1-10)
    Scale,
    /// One of a fixed list of options (appetite: none/low/normal)
    Enumeration,
    /// Free text
    Text,
    /// Reference to a stored photo
    Image,
}

impl DataType {
    /// Get all data types for iteration
    pub fn all() -> &'static [DataType] {
        &[
            DataType::Numeric,
            DataType::Boolean,
            DataType::Scale,
            DataType::Enumeration,
            DataType::Text,
            DataType::Image,
        ]
    }

    /// Configuration this data type needs
    pub fn requirements(&self) -> TypeRequirements {
        describe(*self)
    }

    /// Whether window statistics (average, min, max) apply
    pub fn has_statistics(&self) -> bool {
        matches!(self, DataType::Numeric | DataType::Scale)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Numeric => write!(f, "NUMERIC"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Scale => write!(f, "SCALE"),
            DataType::Enumeration => write!(f, "ENUMERATION"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Image => write!(f, "IMAGE"),
        }
    }
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NUMERIC" => Ok(DataType::Numeric),
            "BOOLEAN" => Ok(DataType::Boolean),
            "SCALE" => Ok(DataType::Scale),
            "ENUMERATION" => Ok(DataType::Enumeration),
            "TEXT" => Ok(DataType::Text),
            "IMAGE" => Ok(DataType::Image),
            other => Err(format!("Unknown data type: {}", other)),
        }
    }
}

/// Which schema fields a data type depends on
///
/// Used by the validator and by form builders deciding which inputs to show.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct TypeRequirements {
    pub requires_units: bool,
    pub requires_range: bool,
    pub requires_options: bool,
}

/// Describe the configuration a data type requires
pub fn describe(data_type: DataType) -> TypeRequirements {
    match data_type {
        DataType::Numeric => TypeRequirements {
            requires_units: true,
            ..Default::default()
        },
        DataType::Scale => TypeRequirements {
            requires_range: true,
            ..Default::default()
        },
        DataType::Enumeration => TypeRequirements {
            requires_options: true,
            ..Default::default()
        },
        DataType::Boolean | DataType::Text | DataType::Image => TypeRequirements::default(),
    }
}

/// Definition of a monitored symptom
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomSchema {
    /// Unique identifier
    pub id: Uuid,
    /// Monitoring plan this schema belongs to
    pub plan_id: Uuid,
    /// Human-readable name (e.g., "Temperature", "Pain score")
    pub name: String,
    /// Grouping used by timelines and reports (e.g., "vitals", "behaviour")
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub data_type: DataType,
    /// Display unit, never validated
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    /// Allowed values for ENUMERATION, in display order
    #[serde(default)]
    pub options: Vec<String>,
    /// Bumped on every revision of type, bounds or options
    #[serde(default = "initial_version")]
    pub version: u32,
}

fn initial_version() -> u32 {
    1
}

impl SymptomSchema {
    /// Create a new schema with required fields
    pub fn new(
        plan_id: Uuid,
        name: impl Into<String>,
        category: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            name: name.into(),
            category: category.into(),
            description: None,
            data_type,
            units: None,
            min_value: None,
            max_value: None,
            options: Vec::new(),
            version: initial_version(),
        }
    }

    /// Builder: set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Builder: set display units
    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Builder: set valid range
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Builder: set enumeration options
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Check the schema for internal consistency
    pub fn check(&self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        for (field, bound) in [("min_value", self.min_value), ("max_value", self.max_value)] {
            if let Some(v) = bound {
                if !v.is_finite() {
                    return Err(SchemaError::NonFiniteBound {
                        schema: self.name.clone(),
                        field,
                    });
                }
            }
        }

        let explicit = (self.min_value, self.max_value);
        let effective = self.effective_bounds().unwrap_or(explicit);
        for bounds in [explicit, effective] {
            if let (Some(min), Some(max)) = bounds {
                if min > max {
                    return Err(SchemaError::InvertedRange {
                        schema: self.name.clone(),
                        min,
                        max,
                    });
                }
            }
        }

        if self.data_type == DataType::Enumeration && self.options.is_empty() {
            return Err(SchemaError::MissingOptions {
                schema: self.name.clone(),
            });
        }

        Ok(())
    }

    /// Bounds enforced on values of this schema
    ///
    /// `None` for types without numeric semantics. SCALE always yields both
    /// bounds, falling back to 1 and 10.
    pub fn effective_bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        match self.data_type {
            DataType::Numeric => Some((self.min_value, self.max_value)),
            DataType::Scale => Some((
                Some(self.min_value.unwrap_or(DEFAULT_SCALE_MIN)),
                Some(self.max_value.unwrap_or(DEFAULT_SCALE_MAX)),
            )),
            _ => None,
        }
    }

    /// Column header used in exports: `name (units)` or just `name`
    pub fn column_header(&self) -> String {
        match self.units.as_deref().map(str::trim) {
            Some(units) if !units.is_empty() => format!("{} ({})", self.name, units),
            _ => self.name.clone(),
        }
    }

    /// Apply an edit, returning the next version of this schema
    ///
    /// Identity is kept. Observations recorded earlier keep the version they
    /// were validated under and are not re-checked.
    pub fn revise(&self, revision: SchemaRevision) -> SchemaResult<Self> {
        let mut next = self.clone();
        if let Some(name) = revision.name {
            next.name = name;
        }
        if let Some(description) = revision.description {
            next.description = Some(description);
        }
        if let Some(data_type) = revision.data_type {
            next.data_type = data_type;
        }
        if let Some(units) = revision.units {
            next.units = Some(units);
        }
        if let Some(min) = revision.min_value {
            next.min_value = Some(min);
        }
        if let Some(max) = revision.max_value {
            next.max_value = Some(max);
        }
        if let Some(options) = revision.options {
            next.options = options;
        }
        next.check()?;

        if next.data_type != self.data_type
            || next.min_value != self.min_value
            || next.max_value != self.max_value
            || next.options != self.options
        {
            next.version = self.version + 1;
        }
        Ok(next)
    }
}

/// A partial edit of a schema; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaRevision {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data_type: Option<DataType>,
    pub units: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub options: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_describe() {
        assert!(describe(DataType::Numeric).requires_units);
        assert!(!describe(DataType::Numeric).requires_range);
        assert!(describe(DataType::Scale).requires_range);
        assert!(describe(DataType::Enumeration).requires_options);
        assert_eq!(describe(DataType::Text), TypeRequirements::default());
        assert_eq!(describe(DataType::Image), TypeRequirements::default());
    }

    #[test]
    fn test_data_type_parse_and_display() {
        for dt in DataType::all() {
            let parsed: DataType = dt.to_string().parse().unwrap();
            assert_eq!(*dt, parsed);
        }
        assert_eq!("scale".parse::<DataType>().unwrap(), DataType::Scale);
        assert!("colour".parse::<DataType>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&DataType::Enumeration).unwrap();
        assert_eq!(json, "\"ENUMERATION\"");
    }

    #[test]
    fn test_check_rejects_inverted_range() {
        let schema = SymptomSchema::new(plan(), "Weight", "vitals", DataType::Numeric)
            .range(20.0, 5.0);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_check_rejects_scale_bound_past_default() {
        let mut schema = SymptomSchema::new(plan(), "Pain", "pain", DataType::Scale);
        schema.min_value = Some(12.0);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvertedRange { min, max, .. }) if min == 12.0 && max == 10.0
        ));

        schema.max_value = Some(20.0);
        assert!(schema.check().is_ok());

        let mut schema = SymptomSchema::new(plan(), "Pain", "pain", DataType::Scale);
        schema.max_value = Some(0.5);
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_check_rejects_enumeration_without_options() {
        let schema = SymptomSchema::new(plan(), "Appetite", "behaviour", DataType::Enumeration);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::MissingOptions { .. })
        ));

        let schema = schema.options(["none", "low", "normal"]);
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_check_rejects_non_finite_bounds() {
        let mut schema = SymptomSchema::new(plan(), "Temp", "vitals", DataType::Numeric);
        schema.max_value = Some(f64::INFINITY);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::NonFiniteBound { field: "max_value", .. })
        ));
    }

    #[test]
    fn test_scale_default_bounds() {
        let schema = SymptomSchema::new(plan(), "Pain", "pain", DataType::Scale);
        assert_eq!(schema.effective_bounds(), Some((Some(1.0), Some(10.0))));

        let schema = schema.range(0.0, 5.0);
        assert_eq!(schema.effective_bounds(), Some((Some(0.0), Some(5.0))));

        let numeric = SymptomSchema::new(plan(), "Temp", "vitals", DataType::Numeric);
        assert_eq!(numeric.effective_bounds(), Some((None, None)));

        let text = SymptomSchema::new(plan(), "Notes", "general", DataType::Text);
        assert_eq!(text.effective_bounds(), None);
    }

    #[test]
    fn test_column_header() {
        let schema = SymptomSchema::new(plan(), "Temperature", "vitals", DataType::Numeric)
            .units("°C");
        assert_eq!(schema.column_header(), "Temperature (°C)");

        let schema = SymptomSchema::new(plan(), "Vomiting", "gi", DataType::Boolean);
        assert_eq!(schema.column_header(), "Vomiting");
    }

    #[test]
    fn test_revise_bumps_version_on_rule_change() {
        let schema = SymptomSchema::new(plan(), "Pain", "pain", DataType::Scale).range(1.0, 10.0);

        let renamed = schema
            .revise(SchemaRevision {
                name: Some("Pain score".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(renamed.version, 1);
        assert_eq!(renamed.id, schema.id);

        let narrowed = renamed
            .revise(SchemaRevision {
                max_value: Some(5.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(narrowed.version, 2);
        assert_eq!(narrowed.max_value, Some(5.0));
    }

    #[test]
    fn test_revise_rejects_inconsistent_edit() {
        let schema = SymptomSchema::new(plan(), "Pain", "pain", DataType::Scale).range(1.0, 10.0);
        let result = schema.revise(SchemaRevision {
            min_value: Some(11.0),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
