//! VetWatch Analytics Engine
//!
//! Pure, synchronous computations over already-fetched series:
//!
//! - **window**: filter and sort a series by a time window
//! - **stats**: latest / average / min / max of a windowed series
//! - **progress**: change, status tier and progress toward a target
//! - **timeline**: positional layout, ticks, grouping and zoom
//! - **export**: date-aligned tables and CSV
//! - **error**: error types
//!
//! # Read Path
//!
//! ```text
//! Observations → window_series → compute_statistics
//!                              → ProgressRequest::from_series → compute
//!                              → layout_timeline
//!                              → serialize_for_export → CSV
//! ```
//!
//! # Example
//!
//! ```rust
//! use vetwatch::analytics::{compute_progress, ProgressStatus, ProgressThresholds};
//!
//! // pain score fell from 100 to 80, goal is 60
//! let snap = compute_progress(80.0, 100.0, Some(60.0), true, &ProgressThresholds::default());
//! assert_eq!(snap.status, ProgressStatus::SignificantImprovement);
//! assert_eq!(snap.progress_to_target, Some(50.0));
//! ```

pub mod error;
pub mod export;
pub mod progress;
pub mod stats;
pub mod timeline;
pub mod window;

pub use error::{AnalyticsError, AnalyticsResult};
pub use export::{serialize_for_export, DuplicatePolicy, ExportRow, ExportTable, DATE_COLUMN};
pub use progress::{
    compute_progress, progress_to_target, Direction, ProgressRequest, ProgressSnapshot,
    ProgressStatus, ProgressThresholds,
};
pub use stats::{compute_statistics, round_half_up, round_to, SeriesStatistics, NOT_AVAILABLE};
pub use timeline::{
    layout_timeline, tick_interval, DayGroup, EventKind, PositionedEvent, Severity, Tick,
    TimelineEvent, TimelineLayout, TimelineZoom,
};
pub use window::{window_series, ResolvedWindow, TimeWindow, Timestamped};
