// src/application/capture/interceptor.rs
use super::diff::DiffEngine;
use crate::domain::{
    audit::{AuditRecord, AuditStore, SaveOutcome, TrackedMutation},
    errors::{DomainError, DomainResult},
    schema::{AuditTableRegistry, DEFAULT_SCHEMA},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info_span, instrument, warn, Instrument};

pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Partition used for records whose schema cannot be resolved.
    pub default_schema: String,
    pub save_timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
            save_timeout: DEFAULT_SAVE_TIMEOUT,
        }
    }
}

/// Outcome of saving one schema partition.
#[derive(Debug)]
pub struct PartitionResult {
    pub schema: String,
    pub records: usize,
    pub outcome: DomainResult<SaveOutcome>,
}

#[derive(Debug, Default)]
pub struct CaptureReport {
    /// Records produced by the diff step.
    pub captured: usize,
    pub partitions: Vec<PartitionResult>,
}

impl CaptureReport {
    pub fn totals(&self) -> SaveOutcome {
        self.partitions
            .iter()
            .filter_map(|p| p.outcome.as_ref().ok())
            .fold(SaveOutcome::default(), |acc, outcome| acc.merge(*outcome))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DomainError)> {
        self.partitions
            .iter()
            .filter_map(|p| p.outcome.as_ref().err().map(|err| (p.schema.as_str(), err)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// First failed partition, if any, otherwise the combined outcome.
    pub fn into_result(self) -> DomainResult<SaveOutcome> {
        let mut totals = SaveOutcome::default();
        for partition in self.partitions {
            totals = totals.merge(partition.outcome?);
        }
        Ok(totals)
    }
}

/// Commit-point hook: diff the tracked mutations, partition the records by
/// schema and hand each partition to the store.
///
/// Dropping the returned future cancels outstanding partitions; partitions
/// already flushed stay written.
pub struct AuditInterceptor {
    engine: Arc<DiffEngine>,
    store: Arc<dyn AuditStore>,
    audit_tables: Arc<AuditTableRegistry>,
    settings: CaptureSettings,
}

impl AuditInterceptor {
    pub fn new(
        engine: Arc<DiffEngine>,
        store: Arc<dyn AuditStore>,
        audit_tables: Arc<AuditTableRegistry>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            engine,
            store,
            audit_tables,
            settings,
        }
    }

    /// A diff failure aborts before anything is written. Storage failures
    /// are reported per partition and do not stop the remaining ones.
    #[instrument(skip_all, fields(mutations = mutations.len()))]
    pub async fn saving_changes(
        &self,
        mutations: &[TrackedMutation],
    ) -> DomainResult<CaptureReport> {
        let records = self.engine.capture(mutations)?;
        let captured = records.len();
        let mut partitions = Vec::new();

        for (schema, batch) in self.partition_by_schema(records) {
            let outcome = self
                .save_partition(&schema, &batch)
                .instrument(info_span!("audit_partition", schema = %schema, records = batch.len()))
                .await;
            if let Err(err) = &outcome {
                error!(schema = %schema, error = %err, "failed to save audit partition");
            }
            partitions.push(PartitionResult {
                schema,
                records: batch.len(),
                outcome,
            });
        }

        Ok(CaptureReport {
            captured,
            partitions,
        })
    }

    /// Same as [`saving_changes`](Self::saving_changes) but surfaces the
    /// first partition failure after every partition was attempted.
    pub async fn saving_changes_strict(
        &self,
        mutations: &[TrackedMutation],
    ) -> DomainResult<SaveOutcome> {
        self.saving_changes(mutations).await?.into_result()
    }

    /// Groups records by resolved schema, keeping record order within a group
    /// and first-seen order across groups.
    pub fn partition_by_schema(&self, records: Vec<AuditRecord>) -> Vec<(String, Vec<AuditRecord>)> {
        let mut partitions: Vec<(String, Vec<AuditRecord>)> = Vec::new();
        for record in records {
            let schema = self
                .audit_tables
                .schema_of(&record.entity_type)
                .unwrap_or_else(|| self.settings.default_schema.clone());
            match partitions.iter_mut().find(|(existing, _)| *existing == schema) {
                Some((_, batch)) => batch.push(record),
                None => partitions.push((schema, vec![record])),
            }
        }
        partitions
    }

    async fn save_partition(&self, schema: &str, batch: &[AuditRecord]) -> DomainResult<SaveOutcome> {
        let timeout = self.settings.save_timeout;
        let outcome = tokio::time::timeout(timeout, self.store.save(batch, schema))
            .await
            .map_err(|_| {
                DomainError::storage_unavailable(
                    schema,
                    format!("save timed out after {}ms", timeout.as_millis()),
                )
            })??;

        if outcome.skipped > 0 {
            warn!(schema, skipped = outcome.skipped, "audit records without a mapped table were dropped");
        }
        Ok(outcome)
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }
}
