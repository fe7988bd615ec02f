//! # VetWatch
//!
//! Veterinary patient monitoring - typed symptom observations and the
//! time-series analytics built on them.
//!
//! ## Features
//!
//! - **Typed schemas**: numeric, boolean, scale, enumeration, text and image symptoms
//! - **Validation**: per-type rules with tagged, user-facing errors
//! - **Windowing**: relative (7/14/30/90 days) and explicit time windows
//! - **Statistics & progress**: averages, extrema, tiered change and progress to target
//! - **Timelines**: positional layout with zoom, ticks and same-day grouping
//! - **Export**: date-aligned CSV across symptoms
//!
//! ## Modules
//!
//! - [`schema`]: Symptom schema definitions
//! - [`observation`]: Observation values and the validator
//! - [`analytics`]: Windowing, statistics, progress, timeline and export
//! - [`store`]: Repository contract, in-memory store and service
//! - [`config`]: Configuration loading
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use uuid::Uuid;
//! use vetwatch::analytics::{compute_statistics, window_series, TimeWindow};
//! use vetwatch::observation::{validate_value, Observation};
//! use vetwatch::schema::{DataType, SymptomSchema};
//!
//! let schema = SymptomSchema::new(Uuid::new_v4(), "Temperature", "vitals", DataType::Numeric)
//!     .units("°C")
//!     .range(35.0, 43.0);
//!
//! let now = Utc::now();
//! let patient = Uuid::new_v4();
//! let series: Vec<Observation> = [38.4, 39.2, 38.9]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, v)| {
//!         let value = validate_value(&schema, &(*v).into()).unwrap();
//!         Observation::new(patient, &schema, value, now - Duration::days(i as i64))
//!     })
//!     .collect();
//!
//! let week = window_series(&series, &TimeWindow::Last7Days, now);
//! let stats = compute_statistics(&schema, &week).unwrap();
//! assert_eq!(stats.latest, Some(38.4));
//! assert_eq!(stats.average, Some(38.8));
//! ```

pub mod analytics;
pub mod config;
pub mod observation;
pub mod schema;
pub mod store;

// Re-export top-level types for convenience
pub use schema::{describe, DataType, SchemaError, SymptomSchema, TypeRequirements};

pub use observation::{
    validate_value, Observation, ObservationError, ObservationValue, RawValue, ValidationError,
    ValidationRule,
};

pub use analytics::{
    compute_progress, compute_statistics, layout_timeline, serialize_for_export, window_series,
    AnalyticsError, DuplicatePolicy, ExportTable, ProgressSnapshot, ProgressThresholds,
    SeriesStatistics, TimeWindow, TimelineEvent, TimelineLayout, TimelineZoom,
};

pub use store::{
    InMemoryRepository, MonitoringRepository, MonitoringService, ServiceError, StoreError,
};

pub use config::{Config, ConfigError, LoggingConfig};
