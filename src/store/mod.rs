//! Monitoring Store
//!
//! The persistence side of the engine:
//!
//! - **repository**: `MonitoringRepository`, the collaborator contract
//! - **memory**: `InMemoryRepository` with JSON snapshot files
//! - **service**: `MonitoringService`, recording and read-side views
//! - **error**: error types
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use uuid::Uuid;
//! use vetwatch::analytics::TimeWindow;
//! use vetwatch::schema::{DataType, SymptomSchema};
//! use vetwatch::store::{InMemoryRepository, MonitoringService, ProgressGoal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(InMemoryRepository::open("./monitoring.json")?);
//!     let service = MonitoringService::new(repo.clone());
//!
//!     let plan = Uuid::new_v4();
//!     let pain = service
//!         .define_schema(SymptomSchema::new(plan, "Pain score", "pain", DataType::Scale))
//!         .await?;
//!
//!     let patient = Uuid::new_v4();
//!     service
//!         .record_observation(patient, pain.id, 6.0.into(), Some("stiff after rest"), Utc::now())
//!         .await?;
//!
//!     let summary = service
//!         .summarize(patient, pain.id, TimeWindow::Last7Days, Utc::now(), ProgressGoal::default())
//!         .await?;
//!     println!("{} readings", summary.series.len());
//!
//!     repo.save().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod repository;
pub mod service;

pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use memory::{InMemoryRepository, Snapshot, StoreStats};
pub use repository::MonitoringRepository;
pub use service::{MonitoringService, ProgressGoal, SymptomSummary};
