//! Window statistics for numeric series

use serde::Serialize;

use crate::observation::Observation;
use crate::schema::SymptomSchema;

/// Placeholder shown for a statistic with no data
pub const NOT_AVAILABLE: &str = "N/A";

/// Round half toward positive infinity (`Math.round` semantics)
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half-up to a number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

/// Summary of a windowed NUMERIC or SCALE series
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct SeriesStatistics {
    /// Number of points that contributed
    pub count: usize,
    /// Value of the chronologically last point
    pub latest: Option<f64>,
    /// Arithmetic mean, one decimal
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesStatistics {
    /// Compute statistics over values already in chronological order
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let sum: f64 = values.iter().sum();
        Self {
            count: values.len(),
            latest: values.last().copied(),
            average: Some(round_to(sum / values.len() as f64, 1)),
            min: Some(values.iter().cloned().fold(f64::INFINITY, f64::min)),
            max: Some(values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Display form of a statistic: the number, or "N/A"
    pub fn display(value: Option<f64>) -> String {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl std::fmt::Display for SeriesStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "latest={} average={} min={} max={} ({} readings)",
            Self::display(self.latest),
            Self::display(self.average),
            Self::display(self.min),
            Self::display(self.max),
            self.count
        )
    }
}

/// Compute the statistics panel for a windowed series
///
/// Returns `None` when the schema's data type has no statistics (BOOLEAN,
/// ENUMERATION, TEXT, IMAGE). The series is expected in chronological order,
/// as produced by `window_series`; points without a numeric reading are
/// skipped.
pub fn compute_statistics(
    schema: &SymptomSchema,
    windowed: &[Observation],
) -> Option<SeriesStatistics> {
    if !schema.data_type.has_statistics() {
        return None;
    }

    let values: Vec<f64> = windowed
        .iter()
        .filter_map(|obs| obs.value.as_f64())
        .collect();

    Some(SeriesStatistics::from_values(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationValue;
    use crate::schema::DataType;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn observe(schema: &SymptomSchema, values: &[ObservationValue]) -> Vec<Observation> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let patient = Uuid::new_v4();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Observation::new(patient, schema, v.clone(), start + Duration::days(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_to(3.25, 1), 3.3);
        assert_eq!(round_to(-2.25, 1), -2.2);
    }

    #[test]
    fn test_numeric_statistics() {
        let schema = SymptomSchema::new(Uuid::new_v4(), "Temp", "vitals", DataType::Numeric);
        let series = observe(
            &schema,
            &[
                ObservationValue::Numeric(38.0),
                ObservationValue::Numeric(39.5),
                ObservationValue::Numeric(38.6),
            ],
        );

        let stats = compute_statistics(&schema, &series).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.latest, Some(38.6));
        assert_eq!(stats.average, Some(38.7));
        assert_eq!(stats.min, Some(38.0));
        assert_eq!(stats.max, Some(39.5));
    }

    #[test]
    fn test_scale_statistics() {
        let schema = SymptomSchema::new(Uuid::new_v4(), "Pain", "pain", DataType::Scale);
        let series = observe(
            &schema,
            &[ObservationValue::Scale(7.0), ObservationValue::Scale(4.0)],
        );

        let stats = compute_statistics(&schema, &series).unwrap();
        assert_eq!(stats.latest, Some(4.0));
        assert_eq!(stats.average, Some(5.5));
    }

    #[test]
    fn test_empty_series_reports_not_available() {
        let schema = SymptomSchema::new(Uuid::new_v4(), "Temp", "vitals", DataType::Numeric);
        let stats = compute_statistics(&schema, &[]).unwrap();

        assert!(stats.is_empty());
        assert_eq!(SeriesStatistics::display(stats.latest), "N/A");
        assert_eq!(
            stats.to_string(),
            "latest=N/A average=N/A min=N/A max=N/A (0 readings)"
        );
    }

    #[test]
    fn test_no_panel_for_non_numeric_types() {
        for dt in [
            DataType::Boolean,
            DataType::Enumeration,
            DataType::Text,
            DataType::Image,
        ] {
            let schema = SymptomSchema::new(Uuid::new_v4(), "x", "general", dt);
            assert!(compute_statistics(&schema, &[]).is_none());
        }

        let schema = SymptomSchema::new(Uuid::new_v4(), "Vomiting", "gi", DataType::Boolean);
        let series = observe(&schema, &[ObservationValue::Boolean(true)]);
        assert!(compute_statistics(&schema, &series).is_none());
    }
}
