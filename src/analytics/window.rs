//! Time-Series Windowing
//!
//! Filters a series to a time window and sorts it chronologically. "Now" is
//! always supplied by the caller so results are reproducible.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::observation::Observation;

/// Anything positioned in time
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for Observation {
    fn timestamp(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// A relative or absolute time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    Last7Days,
    Last14Days,
    Last30Days,
    Last90Days,
    All,
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Last30Days
    }
}

/// A window resolved to absolute bounds (both inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ResolvedWindow {
    /// Check if a timestamp falls within this window
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

impl TimeWindow {
    /// Create an explicit window, rejecting `start > end`
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> AnalyticsResult<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidWindow(format!(
                "start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(TimeWindow::Between { start, end })
    }

    /// Length of a named relative window in days
    pub fn days(&self) -> Option<i64> {
        match self {
            TimeWindow::Last7Days => Some(7),
            TimeWindow::Last14Days => Some(14),
            TimeWindow::Last30Days => Some(30),
            TimeWindow::Last90Days => Some(90),
            TimeWindow::All | TimeWindow::Between { .. } => None,
        }
    }

    /// Resolve to absolute bounds relative to `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> ResolvedWindow {
        match self {
            TimeWindow::All => ResolvedWindow {
                start: None,
                end: None,
            },
            TimeWindow::Between { start, end } => ResolvedWindow {
                start: Some(*start),
                end: Some(*end),
            },
            relative => {
                let days = relative.days().unwrap_or_default();
                ResolvedWindow {
                    start: Some(now - Duration::days(days)),
                    end: Some(now),
                }
            }
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Last7Days => write!(f, "7days"),
            TimeWindow::Last14Days => write!(f, "14days"),
            TimeWindow::Last30Days => write!(f, "30days"),
            TimeWindow::Last90Days => write!(f, "90days"),
            TimeWindow::All => write!(f, "all"),
            TimeWindow::Between { start, end } => {
                write!(f, "{}..{}", start.to_rfc3339(), end.to_rfc3339())
            }
        }
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "7days" | "7d" => return Ok(TimeWindow::Last7Days),
            "14days" | "14d" => return Ok(TimeWindow::Last14Days),
            "30days" | "30d" => return Ok(TimeWindow::Last30Days),
            "90days" | "90d" => return Ok(TimeWindow::Last90Days),
            "all" => return Ok(TimeWindow::All),
            _ => {}
        }

        if let Some((start, end)) = s.split_once("..") {
            let start = parse_bound(start)?;
            let end = parse_bound(end)?;
            return TimeWindow::between(start, end);
        }

        Err(AnalyticsError::InvalidWindow(format!(
            "'{}' (expected 7days, 14days, 30days, 90days, all or START..END)",
            s
        )))
    }
}

fn parse_bound(s: &str) -> AnalyticsResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(AnalyticsError::InvalidWindow(format!(
        "cannot parse timestamp '{}'",
        s
    )))
}

impl TryFrom<String> for TimeWindow {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(w: TimeWindow) -> Self {
        w.to_string()
    }
}

/// Filter a series to a window and sort it ascending by time
///
/// The sort is stable: records sharing a timestamp keep their input order.
pub fn window_series<T>(series: &[T], window: &TimeWindow, now: DateTime<Utc>) -> Vec<T>
where
    T: Timestamped + Clone,
{
    let bounds = window.resolve(now);
    let mut windowed: Vec<T> = series
        .iter()
        .filter(|item| bounds.contains(item.timestamp()))
        .cloned()
        .collect();
    windowed.sort_by_key(|item| item.timestamp());
    windowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationValue;
    use crate::schema::{DataType, SymptomSchema};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
    }

    fn series(days_ago: &[i64]) -> Vec<Observation> {
        let schema = SymptomSchema::new(Uuid::new_v4(), "Temp", "vitals", DataType::Numeric);
        let patient = Uuid::new_v4();
        days_ago
            .iter()
            .map(|d| {
                Observation::new(
                    patient,
                    &schema,
                    ObservationValue::Numeric(*d as f64),
                    now() - Duration::days(*d),
                )
            })
            .collect()
    }

    fn values(series: &[Observation]) -> Vec<f64> {
        series.iter().filter_map(|o| o.value.as_f64()).collect()
    }

    #[test]
    fn test_named_windows_filter_and_sort() {
        let input = series(&[3, 40, 0, 10, 89, 100, 7]);

        let w = window_series(&input, &TimeWindow::Last7Days, now());
        assert_eq!(values(&w), vec![7.0, 3.0, 0.0]);

        let w = window_series(&input, &TimeWindow::Last14Days, now());
        assert_eq!(values(&w), vec![10.0, 7.0, 3.0, 0.0]);

        let w = window_series(&input, &TimeWindow::Last90Days, now());
        assert_eq!(values(&w), vec![89.0, 40.0, 10.0, 7.0, 3.0, 0.0]);
    }

    #[test]
    fn test_all_returns_everything_sorted_regardless_of_now() {
        let input = series(&[5, -3, 400, 1]);
        let far_past = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();

        for reference in [now(), far_past] {
            let w = window_series(&input, &TimeWindow::All, reference);
            assert_eq!(values(&w), vec![400.0, 5.0, 1.0, -3.0]);
        }
    }

    #[test]
    fn test_windowing_is_idempotent() {
        let input = series(&[1, 20, 2, 9, 30, 31]);
        for window in [TimeWindow::Last7Days, TimeWindow::Last30Days, TimeWindow::All] {
            let once = window_series(&input, &window, now());
            let twice = window_series(&once, &window, now());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_stable_sort_on_ties() {
        let mut input = series(&[2, 2, 2]);
        input[0].value = ObservationValue::Numeric(1.0);
        input[1].value = ObservationValue::Numeric(2.0);
        input[2].value = ObservationValue::Numeric(3.0);

        let w = window_series(&input, &TimeWindow::All, now());
        assert_eq!(values(&w), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_series() {
        let w = window_series::<Observation>(&[], &TimeWindow::Last30Days, now());
        assert!(w.is_empty());
    }

    #[test]
    fn test_explicit_window_is_inclusive() {
        let input = series(&[0, 1, 2, 3]);
        let window = TimeWindow::between(now() - Duration::days(2), now() - Duration::days(1))
            .unwrap();
        let w = window_series(&input, &window, now());
        assert_eq!(values(&w), vec![2.0, 1.0]);
    }

    #[test]
    fn test_between_rejects_inverted_range() {
        assert!(TimeWindow::between(now(), now() - Duration::days(1)).is_err());
        assert!(TimeWindow::between(now(), now()).is_ok());
    }

    #[test]
    fn test_parse_window() {
        assert_eq!("7days".parse::<TimeWindow>().unwrap(), TimeWindow::Last7Days);
        assert_eq!("30D".parse::<TimeWindow>().unwrap(), TimeWindow::Last30Days);
        assert_eq!("all".parse::<TimeWindow>().unwrap(), TimeWindow::All);

        let w: TimeWindow = "2024-01-01..2024-01-31".parse().unwrap();
        assert_eq!(
            w.resolve(now()).start,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );

        assert!("2024-02-01..2024-01-01".parse::<TimeWindow>().is_err());
        assert!("fortnight".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn test_window_serde_as_string() {
        let json = serde_json::to_string(&TimeWindow::Last14Days).unwrap();
        assert_eq!(json, "\"14days\"");
        let w: TimeWindow = serde_json::from_str("\"90days\"").unwrap();
        assert_eq!(w, TimeWindow::Last90Days);
    }
}
