//! In-memory repository with JSON snapshots
//!
//! Holds schemas and observations behind a Tokio `RwLock`. When opened from a
//! path, `save` writes the whole snapshot back as pretty JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::observation::Observation;
use crate::schema::SymptomSchema;
use crate::store::error::StoreResult;
use crate::store::repository::MonitoringRepository;

/// Serialized contents of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub schemas: Vec<SymptomSchema>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// Store counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub schema_count: usize,
    pub observation_count: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "schemas={}, observations={}",
            self.schema_count, self.observation_count
        )
    }
}

/// Repository kept in memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    data: RwLock<Snapshot>,
    path: Option<PathBuf>,
}

impl InMemoryRepository {
    /// Create an empty repository without backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with a snapshot
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            path: None,
        }
    }

    /// Open a repository backed by a JSON file; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&content)?;
            tracing::info!(
                path = %path.display(),
                schemas = snapshot.schemas.len(),
                observations = snapshot.observations.len(),
                "Loaded monitoring snapshot"
            );
            snapshot
        } else {
            tracing::debug!(path = %path.display(), "No snapshot found, starting empty");
            Snapshot::default()
        };

        Ok(Self {
            data: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the snapshot to the backing file; no-op without one
    pub async fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = self.data.read().await;
        let content = serde_json::to_string_pretty(&*data)?;
        std::fs::write(path, content)?;

        tracing::debug!(
            path = %path.display(),
            observations = data.observations.len(),
            "Saved monitoring snapshot"
        );
        Ok(())
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    pub async fn stats(&self) -> StoreStats {
        let data = self.data.read().await;
        StoreStats {
            schema_count: data.schemas.len(),
            observation_count: data.observations.len(),
        }
    }
}

#[async_trait]
impl MonitoringRepository for InMemoryRepository {
    async fn get_observations(
        &self,
        patient_id: Uuid,
        schema_id: Uuid,
    ) -> StoreResult<Vec<Observation>> {
        let data = self.data.read().await;
        Ok(data
            .observations
            .iter()
            .filter(|o| o.patient_id == patient_id && o.schema_id == schema_id)
            .cloned()
            .collect())
    }

    async fn get_symptom_schemas(&self, plan_id: Uuid) -> StoreResult<Vec<SymptomSchema>> {
        let data = self.data.read().await;
        Ok(data
            .schemas
            .iter()
            .filter(|s| s.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn get_symptom_schema(&self, schema_id: Uuid) -> StoreResult<Option<SymptomSchema>> {
        let data = self.data.read().await;
        Ok(data.schemas.iter().find(|s| s.id == schema_id).cloned())
    }

    async fn save_symptom_schema(&self, schema: SymptomSchema) -> StoreResult<()> {
        schema.check()?;

        let mut data = self.data.write().await;
        match data.schemas.iter_mut().find(|s| s.id == schema.id) {
            Some(existing) => *existing = schema,
            None => data.schemas.push(schema),
        }
        Ok(())
    }

    async fn append_observation(&self, observation: Observation) -> StoreResult<()> {
        self.data.write().await.observations.push(observation);
        Ok(())
    }
}
