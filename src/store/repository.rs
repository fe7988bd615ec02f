//! Repository contract
//!
//! The persistence collaborator the analytics core reads from. Transport and
//! storage format are up to the implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::observation::Observation;
use crate::schema::SymptomSchema;
use crate::store::error::StoreResult;

/// Source of schemas and observations
#[async_trait]
pub trait MonitoringRepository: Send + Sync {
    /// All observations of one schema for one patient, in no particular order
    async fn get_observations(&self, patient_id: Uuid, schema_id: Uuid)
        -> StoreResult<Vec<Observation>>;

    /// Schemas of a monitoring plan, in definition order
    async fn get_symptom_schemas(&self, plan_id: Uuid) -> StoreResult<Vec<SymptomSchema>>;

    /// Look up a single schema
    async fn get_symptom_schema(&self, schema_id: Uuid) -> StoreResult<Option<SymptomSchema>>;

    /// Insert a schema, or replace the one with the same id
    async fn save_symptom_schema(&self, schema: SymptomSchema) -> StoreResult<()>;

    /// Append a validated observation
    async fn append_observation(&self, observation: Observation) -> StoreResult<()>;
}
