//! Export Serializer
//!
//! Flattens several series of one patient into a date-aligned table:
//!
//! ```text
//! Date       | Temperature (°C) | Pain score | Appetite
//! 2024-01-01 | 38.6             |            | normal
//! 2024-01-02 |                  | 4          | reduced
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::stats::round_to;
use crate::observation::{Observation, ObservationValue};
use crate::schema::SymptomSchema;

/// Header of the leading date column
pub const DATE_COLUMN: &str = "Date";

/// How to resolve several observations of one schema on the same day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// First observation found in input order
    First,
    /// Latest `recorded_at`; ties go to the later input
    #[default]
    Last,
    /// Mean of numeric readings (one decimal); non-numeric falls back to `Last`
    Average,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(DuplicatePolicy::First),
            "last" => Ok(DuplicatePolicy::Last),
            "average" | "avg" => Ok(DuplicatePolicy::Average),
            other => Err(format!("Unknown duplicate policy: {}", other)),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::First => write!(f, "first"),
            DuplicatePolicy::Last => write!(f, "last"),
            DuplicatePolicy::Average => write!(f, "average"),
        }
    }
}

/// One dated row; `cells[i]` belongs to `headers[i + 1]`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub cells: Vec<Option<String>>,
}

/// Date-aligned table of several series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as CSV; missing cells are empty fields
    pub fn to_csv(&self) -> AnalyticsResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.cells.len() + 1);
            record.push(row.date.format("%Y-%m-%d").to_string());
            record.extend(row.cells.iter().map(|c| c.clone().unwrap_or_default()));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AnalyticsError::Encoding(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AnalyticsError::Encoding(e.to_string()))
    }
}

/// Build the export table for one patient's series
pub fn serialize_for_export(
    series: &[(SymptomSchema, Vec<Observation>)],
    policy: DuplicatePolicy,
) -> ExportTable {
    let mut headers = Vec::with_capacity(series.len() + 1);
    headers.push(DATE_COLUMN.to_string());
    headers.extend(series.iter().map(|(schema, _)| schema.column_header()));

    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|(_, observations)| observations.iter().map(|o| o.recorded_at.date_naive()))
        .collect();

    let by_day: Vec<BTreeMap<NaiveDate, Vec<&Observation>>> = series
        .iter()
        .map(|(_, observations)| {
            let mut days: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
            for obs in observations {
                days.entry(obs.recorded_at.date_naive()).or_default().push(obs);
            }
            days
        })
        .collect();

    let rows = dates
        .into_iter()
        .map(|date| ExportRow {
            date,
            cells: by_day
                .iter()
                .map(|days| days.get(&date).and_then(|same_day| resolve(same_day, policy)))
                .collect(),
        })
        .collect();

    ExportTable { headers, rows }
}

fn resolve(same_day: &[&Observation], policy: DuplicatePolicy) -> Option<String> {
    let last = || {
        same_day
            .iter()
            .enumerate()
            .max_by_key(|(i, o)| (o.recorded_at, *i))
            .map(|(_, o)| o.value.to_string())
    };

    match policy {
        DuplicatePolicy::First => same_day.first().map(|o| o.value.to_string()),
        DuplicatePolicy::Last => last(),
        DuplicatePolicy::Average => {
            let values: Option<Vec<f64>> = same_day
                .iter()
                .map(|o| match o.value {
                    ObservationValue::Numeric(v) | ObservationValue::Scale(v) => Some(v),
                    _ => None,
                })
                .collect();
            match values {
                Some(values) if !values.is_empty() => {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    Some(round_to(mean, 1).to_string())
                }
                _ => last(),
            }
        }
    }
}
