//! Progress Engine
//!
//! Compares a current reading with a previous one and, when a goal is set,
//! measures how much of the gap to that goal has been closed.
//!
//! For inverted metrics (pain score, lameness grade) a decrease is an
//! improvement, so the reported direction is swapped and gaps are measured
//! downward.

use serde::{Deserialize, Serialize};

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::stats::round_half_up;
use crate::observation::Observation;

/// Percent-change thresholds separating Slight, Moderate and Significant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProgressThresholds {
    #[serde(default = "default_moderate")]
    pub moderate: f64,
    #[serde(default = "default_significant")]
    pub significant: f64,
}

fn default_moderate() -> f64 {
    5.0
}

fn default_significant() -> f64 {
    15.0
}

impl Default for ProgressThresholds {
    fn default() -> Self {
        Self {
            moderate: default_moderate(),
            significant: default_significant(),
        }
    }
}

impl ProgressThresholds {
    /// Create thresholds, rejecting `moderate > significant`
    pub fn new(moderate: f64, significant: f64) -> AnalyticsResult<Self> {
        let thresholds = Self {
            moderate,
            significant,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if !(self.moderate.is_finite() && self.significant.is_finite())
            || self.moderate > self.significant
        {
            return Err(AnalyticsError::InvalidThresholds {
                moderate: self.moderate,
                significant: self.significant,
            });
        }
        Ok(())
    }
}

/// Direction of change
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Unchanged,
}

impl Direction {
    fn of(change: f64) -> Self {
        if change > 0.0 {
            Direction::Increase
        } else if change < 0.0 {
            Direction::Decrease
        } else {
            Direction::Unchanged
        }
    }

    fn inverted(self) -> Self {
        match self {
            Direction::Increase => Direction::Decrease,
            Direction::Decrease => Direction::Increase,
            Direction::Unchanged => Direction::Unchanged,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Increase => write!(f, "increase"),
            Direction::Decrease => write!(f, "decrease"),
            Direction::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Tiered status label
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    SignificantImprovement,
    ModerateImprovement,
    SlightImprovement,
    Unchanged,
    SlightDecline,
    ModerateDecline,
    SignificantDecline,
}

impl ProgressStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::SignificantImprovement => "Significant Improvement",
            ProgressStatus::ModerateImprovement => "Moderate Improvement",
            ProgressStatus::SlightImprovement => "Slight Improvement",
            ProgressStatus::Unchanged => "Unchanged",
            ProgressStatus::SlightDecline => "Slight Decline",
            ProgressStatus::ModerateDecline => "Moderate Decline",
            ProgressStatus::SignificantDecline => "Significant Decline",
        }
    }

    pub fn is_improvement(&self) -> bool {
        matches!(
            self,
            ProgressStatus::SignificantImprovement
                | ProgressStatus::ModerateImprovement
                | ProgressStatus::SlightImprovement
        )
    }

    fn tier(direction: Direction, change_percent: f64, thresholds: &ProgressThresholds) -> Self {
        let significant = change_percent >= thresholds.significant;
        let moderate = change_percent >= thresholds.moderate;
        match direction {
            Direction::Unchanged => ProgressStatus::Unchanged,
            Direction::Increase if significant => ProgressStatus::SignificantImprovement,
            Direction::Increase if moderate => ProgressStatus::ModerateImprovement,
            Direction::Increase => ProgressStatus::SlightImprovement,
            Direction::Decrease if significant => ProgressStatus::SignificantDecline,
            Direction::Decrease if moderate => ProgressStatus::ModerateDecline,
            Direction::Decrease => ProgressStatus::SlightDecline,
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived comparison of two readings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressSnapshot {
    pub current: f64,
    pub previous: f64,
    pub target: Option<f64>,
    pub unit: Option<String>,
    pub is_inverted: bool,
    /// `current - previous`
    pub change_value: f64,
    /// Whole percent of `|change / previous|`; 0 when previous is 0
    pub change_percent: f64,
    /// Sign of the numeric change
    pub raw_direction: Direction,
    /// Direction after inversion; Increase always means "better"
    pub direction: Direction,
    pub status: ProgressStatus,
    /// Share of the gap to target closed, 0-100
    pub progress_to_target: Option<f64>,
}

/// Builder for a progress computation
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRequest {
    current: f64,
    previous: f64,
    target: Option<f64>,
    unit: Option<String>,
    is_inverted: bool,
    thresholds: ProgressThresholds,
}

impl ProgressRequest {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            target: None,
            unit: None,
            is_inverted: false,
            thresholds: ProgressThresholds::default(),
        }
    }

    /// Build a request from the last two numeric points of a windowed series
    pub fn from_series(windowed: &[Observation]) -> Option<Self> {
        let mut numeric = windowed.iter().rev().filter_map(|o| o.value.as_f64());
        let current = numeric.next()?;
        let previous = numeric.next()?;
        Some(Self::new(current, previous))
    }

    pub fn target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn maybe_target(mut self, target: Option<f64>) -> Self {
        self.target = target;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn inverted(mut self, is_inverted: bool) -> Self {
        self.is_inverted = is_inverted;
        self
    }

    pub fn thresholds(mut self, thresholds: ProgressThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn compute(self) -> ProgressSnapshot {
        let change_value = self.current - self.previous;
        let change_percent = if self.previous == 0.0 {
            0.0
        } else {
            round_half_up((change_value / self.previous).abs() * 100.0)
        };

        let raw_direction = Direction::of(change_value);
        let direction = if self.is_inverted {
            raw_direction.inverted()
        } else {
            raw_direction
        };
        let status = ProgressStatus::tier(direction, change_percent, &self.thresholds);

        let progress_to_target = self
            .target
            .map(|target| progress_to_target(self.current, self.previous, target, self.is_inverted));

        ProgressSnapshot {
            current: self.current,
            previous: self.previous,
            target: self.target,
            unit: self.unit,
            is_inverted: self.is_inverted,
            change_value,
            change_percent,
            raw_direction,
            direction,
            status,
            progress_to_target,
        }
    }
}

/// Compare two readings
pub fn compute_progress(
    current: f64,
    previous: f64,
    target: Option<f64>,
    is_inverted: bool,
    thresholds: &ProgressThresholds,
) -> ProgressSnapshot {
    ProgressRequest::new(current, previous)
        .maybe_target(target)
        .inverted(is_inverted)
        .thresholds(*thresholds)
        .compute()
}

/// Share of the gap between `previous` and `target` closed by `current`
pub fn progress_to_target(current: f64, previous: f64, target: f64, is_inverted: bool) -> f64 {
    let (initial_gap, current_gap) = if is_inverted {
        (previous - target, current - target)
    } else {
        (target - previous, target - current)
    };

    if initial_gap <= 0.0 {
        return 100.0;
    }

    round_half_up((initial_gap - current_gap) / initial_gap * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(current: f64, previous: f64) -> ProgressRequest {
        ProgressRequest::new(current, previous)
    }

    #[test]
    fn test_inverted_decrease_is_improvement() {
        let snap = progress(80.0, 100.0).target(60.0).inverted(true).compute();

        assert_eq!(snap.change_value, -20.0);
        assert_eq!(snap.change_percent, 20.0);
        assert_eq!(snap.raw_direction, Direction::Decrease);
        assert_eq!(snap.direction, Direction::Increase);
        assert!(snap.status.is_improvement());
        assert_eq!(snap.status, ProgressStatus::SignificantImprovement);
        assert_eq!(snap.progress_to_target, Some(50.0));
    }

    #[test]
    fn test_unchanged() {
        let snap = progress(50.0, 50.0).compute();
        assert_eq!(snap.direction, Direction::Unchanged);
        assert_eq!(snap.change_percent, 0.0);
        assert_eq!(snap.status, ProgressStatus::Unchanged);
        assert_eq!(snap.status.label(), "Unchanged");
        assert_eq!(snap.progress_to_target, None);
    }

    #[test]
    fn test_zero_previous_has_zero_percent() {
        let snap = progress(4.0, 0.0).compute();
        assert_eq!(snap.change_percent, 0.0);
        assert_eq!(snap.direction, Direction::Increase);
        assert_eq!(snap.status, ProgressStatus::SlightImprovement);
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(
            progress(105.0, 100.0).compute().status,
            ProgressStatus::ModerateImprovement
        );
        assert_eq!(
            progress(104.0, 100.0).compute().status,
            ProgressStatus::SlightImprovement
        );
        assert_eq!(
            progress(115.0, 100.0).compute().status,
            ProgressStatus::SignificantImprovement
        );
        assert_eq!(
            progress(85.0, 100.0).compute().status,
            ProgressStatus::SignificantDecline
        );
        assert_eq!(
            progress(90.0, 100.0).compute().status,
            ProgressStatus::ModerateDecline
        );
        assert_eq!(
            progress(99.0, 100.0).compute().status,
            ProgressStatus::SlightDecline
        );
    }

    #[test]
    fn test_inverted_increase_is_decline() {
        let snap = progress(6.0, 4.0).inverted(true).compute();
        assert_eq!(snap.raw_direction, Direction::Increase);
        assert_eq!(snap.direction, Direction::Decrease);
        assert_eq!(snap.change_percent, 50.0);
        assert_eq!(snap.status, ProgressStatus::SignificantDecline);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ProgressThresholds::new(10.0, 30.0).unwrap();
        let snap = compute_progress(120.0, 100.0, None, false, &thresholds);
        assert_eq!(snap.status, ProgressStatus::ModerateImprovement);

        assert!(ProgressThresholds::new(30.0, 10.0).is_err());
        assert!(ProgressThresholds::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_progress_to_target_normal_metric() {
        // weight gain toward 30kg from 20kg
        assert_eq!(progress_to_target(25.0, 20.0, 30.0, false), 50.0);
        assert_eq!(progress_to_target(30.0, 20.0, 30.0, false), 100.0);
        // overshoot clamps
        assert_eq!(progress_to_target(35.0, 20.0, 30.0, false), 100.0);
        // moving away clamps at 0
        assert_eq!(progress_to_target(15.0, 20.0, 30.0, false), 0.0);
    }

    #[test]
    fn test_progress_to_target_gap_already_closed() {
        assert_eq!(progress_to_target(10.0, 30.0, 30.0, false), 100.0);
        assert_eq!(progress_to_target(10.0, 40.0, 30.0, false), 100.0);
        assert_eq!(progress_to_target(3.0, 2.0, 2.0, true), 100.0);
    }

    #[test]
    fn test_from_series_uses_last_two_numeric_points() {
        use crate::observation::ObservationValue;
        use crate::schema::{DataType, SymptomSchema};
        use chrono::{Duration, Utc};
        use uuid::Uuid;

        let schema = SymptomSchema::new(Uuid::new_v4(), "Pain", "pain", DataType::Scale);
        let patient = Uuid::new_v4();
        let start = Utc::now() - Duration::days(3);
        let series: Vec<Observation> = [8.0, 6.0, 5.0]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Observation::new(
                    patient,
                    &schema,
                    ObservationValue::Scale(*v),
                    start + Duration::days(i as i64),
                )
            })
            .collect();

        let snap = ProgressRequest::from_series(&series)
            .unwrap()
            .inverted(true)
            .compute();
        assert_eq!(snap.current, 5.0);
        assert_eq!(snap.previous, 6.0);
        assert_eq!(snap.change_percent, 17.0);
        assert_eq!(snap.status, ProgressStatus::SignificantImprovement);

        assert!(ProgressRequest::from_series(&series[..1]).is_none());
    }
}
