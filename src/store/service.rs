//! Monitoring Service
//!
//! Ties the repository to the validator and the analytics engine:
//!
//! ```text
//! record:    RawValue → validate_value → Observation → repository
//! summarize: repository → window_series → statistics + progress
//! timeline:  repository → TimelineEvent projection → layout_timeline
//! export:    repository → window_series per schema → serialize_for_export
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::{
    compute_statistics, layout_timeline, serialize_for_export, window_series, DuplicatePolicy,
    ExportTable, ProgressRequest, ProgressSnapshot, ProgressThresholds, SeriesStatistics,
    TimeWindow, TimelineEvent, TimelineLayout, TimelineZoom,
};
use crate::observation::{validate_notes, validate_value, Observation, RawValue};
use crate::schema::{SchemaRevision, SymptomSchema};
use crate::store::error::{ServiceError, ServiceResult};
use crate::store::repository::MonitoringRepository;

/// Goal for a progress comparison
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressGoal {
    pub target: Option<f64>,
    /// Lower values are better (pain, lameness)
    pub inverted: bool,
}

/// Windowed view of one symptom for one patient
#[derive(Debug, Clone, Serialize)]
pub struct SymptomSummary {
    pub schema: SymptomSchema,
    pub window: TimeWindow,
    pub series: Vec<Observation>,
    /// Absent for types without statistics
    pub statistics: Option<SeriesStatistics>,
    /// Absent with fewer than two numeric points
    pub progress: Option<ProgressSnapshot>,
}

/// Records observations and assembles read-side views
pub struct MonitoringService {
    repository: Arc<dyn MonitoringRepository>,
    thresholds: ProgressThresholds,
    duplicate_policy: DuplicatePolicy,
}

impl MonitoringService {
    pub fn new(repository: Arc<dyn MonitoringRepository>) -> Self {
        Self {
            repository,
            thresholds: ProgressThresholds::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ProgressThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn repository(&self) -> &Arc<dyn MonitoringRepository> {
        &self.repository
    }

    async fn schema(&self, schema_id: Uuid) -> ServiceResult<SymptomSchema> {
        self.repository
            .get_symptom_schema(schema_id)
            .await?
            .ok_or(ServiceError::SchemaNotFound(schema_id))
    }

    /// Add a schema to its plan
    pub async fn define_schema(&self, schema: SymptomSchema) -> ServiceResult<SymptomSchema> {
        schema.check()?;
        self.repository.save_symptom_schema(schema.clone()).await?;

        tracing::info!(
            schema = %schema.name,
            data_type = %schema.data_type,
            plan_id = %schema.plan_id,
            "Defined symptom schema"
        );
        Ok(schema)
    }

    /// Edit a schema; rule changes produce a new version
    pub async fn revise_schema(
        &self,
        schema_id: Uuid,
        revision: SchemaRevision,
    ) -> ServiceResult<SymptomSchema> {
        let current = self.schema(schema_id).await?;
        let next = current.revise(revision)?;
        self.repository.save_symptom_schema(next.clone()).await?;

        if next.version != current.version {
            tracing::info!(
                schema = %next.name,
                from = current.version,
                to = next.version,
                "Revised symptom schema rules"
            );
        }
        Ok(next)
    }

    /// Validate and append an observation
    ///
    /// Rejected values are returned as `ServiceError::Validation` and nothing
    /// is stored.
    pub async fn record_observation(
        &self,
        patient_id: Uuid,
        schema_id: Uuid,
        raw: RawValue,
        notes: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> ServiceResult<Observation> {
        let schema = self.schema(schema_id).await?;

        let validated = validate_value(&schema, &raw).and_then(|value| {
            let notes = validate_notes(notes)?;
            Ok((value, notes))
        });

        let (value, notes) = match validated {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(
                    schema = %schema.name,
                    error = %e,
                    "Rejected observation"
                );
                return Err(e.into());
            }
        };

        let mut observation = Observation::new(patient_id, &schema, value, recorded_at);
        observation.notes = notes;
        self.repository.append_observation(observation.clone()).await?;

        tracing::debug!(
            schema = %schema.name,
            patient_id = %patient_id,
            value = %observation.value,
            "Recorded observation"
        );
        Ok(observation)
    }

    /// Windowed series, statistics and progress for one symptom
    pub async fn summarize(
        &self,
        patient_id: Uuid,
        schema_id: Uuid,
        window: TimeWindow,
        now: DateTime<Utc>,
        goal: ProgressGoal,
    ) -> ServiceResult<SymptomSummary> {
        let schema = self.schema(schema_id).await?;
        let observations = self.repository.get_observations(patient_id, schema_id).await?;
        let series = window_series(&observations, &window, now);

        let statistics = compute_statistics(&schema, &series);
        let progress = if schema.data_type.has_statistics() {
            ProgressRequest::from_series(&series).map(|request| {
                let request = request
                    .maybe_target(goal.target)
                    .inverted(goal.inverted)
                    .thresholds(self.thresholds);
                match &schema.units {
                    Some(units) => request.unit(units.clone()).compute(),
                    None => request.compute(),
                }
            })
        } else {
            None
        };

        Ok(SymptomSummary {
            schema,
            window,
            series,
            statistics,
            progress,
        })
    }

    /// Timeline of every symptom in a plan for one patient
    ///
    /// `extra_events` (medications, treatments, notes from other systems) are
    /// merged in before layout. The window length comes from `zoom`, so it
    /// always sits inside the zoom bounds.
    pub async fn timeline(
        &self,
        patient_id: Uuid,
        plan_id: Uuid,
        extra_events: Vec<TimelineEvent>,
        reference_date: DateTime<Utc>,
        zoom: &TimelineZoom,
        search_term: Option<&str>,
    ) -> ServiceResult<TimelineLayout> {
        let mut events = extra_events;
        for schema in self.repository.get_symptom_schemas(plan_id).await? {
            let observations = self.repository.get_observations(patient_id, schema.id).await?;
            events.extend(
                observations
                    .iter()
                    .map(|o| TimelineEvent::from_observation(o, &schema)),
            );
        }

        Ok(layout_timeline(
            &events,
            reference_date,
            zoom.time_range(),
            search_term,
        ))
    }

    /// Date-aligned table of every symptom in a plan for one patient
    pub async fn export_patient(
        &self,
        patient_id: Uuid,
        plan_id: Uuid,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> ServiceResult<ExportTable> {
        let schemas = self.repository.get_symptom_schemas(plan_id).await?;

        let mut series = Vec::with_capacity(schemas.len());
        for schema in schemas {
            let observations = self.repository.get_observations(patient_id, schema.id).await?;
            series.push((schema, window_series(&observations, &window, now)));
        }

        let table = serialize_for_export(&series, self.duplicate_policy);
        tracing::info!(
            patient_id = %patient_id,
            columns = table.headers.len(),
            rows = table.len(),
            policy = %self.duplicate_policy,
            "Built patient export"
        );
        Ok(table)
    }
}
