//! Timeline Layout Engine
//!
//! Places dated events on a horizontal axis measured in percent of the
//! visible window:
//!
//! ```text
//! events → search filter → sort → visible window → positions
//!                                               ├→ tick marks
//!                                               └→ same-day groups
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::window::Timestamped;
use crate::observation::{Observation, ObservationValue};
use crate::schema::SymptomSchema;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Kind of event shown on a timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Observation,
    Medication,
    Treatment,
    Note,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A dated item on a patient timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub value: Option<ObservationValue>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimelineEvent {
    pub fn new(kind: EventKind, title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            date,
            title: title.into(),
            kind,
            value: None,
            severity: None,
            category: None,
            notes: None,
        }
    }

    /// Project an observation onto the timeline
    pub fn from_observation(observation: &Observation, schema: &SymptomSchema) -> Self {
        Self {
            date: observation.recorded_at,
            title: schema.name.clone(),
            kind: EventKind::Observation,
            value: Some(observation.value.clone()),
            severity: None,
            category: Some(schema.category.clone()),
            notes: observation.notes.clone(),
        }
    }

    pub fn value(mut self, value: ObservationValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Case-insensitive match on notes, category or a string-typed value
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(needle);
        self.notes.as_deref().map_or(false, contains)
            || self.category.as_deref().map_or(false, contains)
            || self
                .value
                .as_ref()
                .and_then(ObservationValue::as_text)
                .map_or(false, contains)
    }
}

impl Timestamped for TimelineEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }
}

/// An event with its horizontal position
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionedEvent {
    pub event: TimelineEvent,
    /// 0 at window start, 100 at the reference date
    pub position: f64,
}

/// A date-axis tick mark
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Tick {
    pub date: NaiveDate,
    pub position: f64,
}

/// Visible events sharing a calendar day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub events: Vec<PositionedEvent>,
}

/// Output of `layout_timeline`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineLayout {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Days used as divisor, never below 1
    pub total_days: f64,
    /// Tick spacing in days
    pub tick_interval_days: i64,
    pub positions: Vec<PositionedEvent>,
    pub ticks: Vec<Tick>,
    pub groups: Vec<DayGroup>,
}

/// Upper bound on ticks per layout; wider windows space them further apart
pub const MAX_TICKS: i64 = 400;

/// Tick spacing for a window length
pub fn tick_interval(time_range_days: u32) -> i64 {
    match time_range_days {
        0..=60 => 1,
        61..=180 => 7,
        _ => 30,
    }
}

/// Lay out events for a window ending at `reference_date`
pub fn layout_timeline(
    events: &[TimelineEvent],
    reference_date: DateTime<Utc>,
    time_range_days: u32,
    search_term: Option<&str>,
) -> TimelineLayout {
    let needle = search_term
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    let mut filtered: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| needle.as_deref().map_or(true, |n| e.matches(n)))
        .collect();
    filtered.sort_by_key(|e| e.date);

    let window_end = reference_date;
    let window_start = reference_date
        .checked_sub_signed(Duration::days(i64::from(time_range_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let span_days = (window_end - window_start).num_days();
    let total_days = span_days.max(1) as f64;

    let position_of = |date: DateTime<Utc>| -> f64 {
        let days = (date - window_start).num_milliseconds() as f64 / MILLIS_PER_DAY;
        (days / total_days * 100.0).clamp(0.0, 100.0)
    };

    let positions: Vec<PositionedEvent> = filtered
        .into_iter()
        .filter(|e| e.date >= window_start && e.date <= window_end)
        .map(|e| PositionedEvent {
            event: e.clone(),
            position: position_of(e.date),
        })
        .collect();

    let interval = tick_interval(time_range_days).max((span_days + MAX_TICKS - 1) / MAX_TICKS);
    let ticks: Vec<Tick> = (0..=span_days)
        .step_by(interval as usize)
        .filter_map(|offset| window_start.checked_add_signed(Duration::days(offset)))
        .map(|at| Tick {
            date: at.date_naive(),
            position: position_of(at),
        })
        .collect();

    let mut by_day: BTreeMap<NaiveDate, Vec<PositionedEvent>> = BTreeMap::new();
    for positioned in &positions {
        by_day
            .entry(positioned.event.date.date_naive())
            .or_default()
            .push(positioned.clone());
    }
    let groups = by_day
        .into_iter()
        .map(|(date, events)| DayGroup { date, events })
        .collect();

    tracing::trace!(
        visible = positions.len(),
        total = events.len(),
        time_range_days,
        "Laid out timeline"
    );

    TimelineLayout {
        window_start,
        window_end,
        total_days,
        tick_interval_days: interval,
        positions,
        ticks,
        groups,
    }
}

/// Zoom state of a timeline, in days
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineZoom {
    time_range: u32,
    min_time_range: u32,
    max_time_range: u32,
}

impl Default for TimelineZoom {
    fn default() -> Self {
        Self {
            time_range: 30,
            min_time_range: 7,
            max_time_range: 365,
        }
    }
}

impl TimelineZoom {
    /// Create a zoom state; the initial range is clamped into bounds
    pub fn new(time_range: u32, min_time_range: u32, max_time_range: u32) -> AnalyticsResult<Self> {
        if min_time_range == 0 || min_time_range > max_time_range {
            return Err(AnalyticsError::InvalidZoomBounds {
                min: min_time_range,
                max: max_time_range,
            });
        }
        Ok(Self {
            time_range: time_range.clamp(min_time_range, max_time_range),
            min_time_range,
            max_time_range,
        })
    }

    pub fn time_range(&self) -> u32 {
        self.time_range
    }

    pub fn bounds(&self) -> (u32, u32) {
        (self.min_time_range, self.max_time_range)
    }

    /// Halve the range, never below the minimum
    pub fn zoom_in(&mut self) -> u32 {
        self.time_range = (self.time_range / 2).max(self.min_time_range);
        self.time_range
    }

    /// Double the range, never above the maximum
    pub fn zoom_out(&mut self) -> u32 {
        self.time_range = self
            .time_range
            .saturating_mul(2)
            .min(self.max_time_range);
        self.time_range
    }
}
