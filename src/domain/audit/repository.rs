// src/domain/audit/repository.rs
use crate::domain::audit::entity::AuditRecord;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// Result of persisting one schema partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub persisted: usize,
    /// Records dropped because their audit table could not be resolved.
    pub skipped: usize,
}

impl SaveOutcome {
    pub fn merge(self, other: SaveOutcome) -> SaveOutcome {
        SaveOutcome {
            persisted: self.persisted + other.persisted,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Persistence boundary for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persists a batch known to belong to `schema`. Records whose qualified
    /// type has no audit table are skipped; any other failure fails the batch.
    async fn save(&self, records: &[AuditRecord], schema: &str) -> DomainResult<SaveOutcome>;

    /// History of one entity, newest `created_at` first. Unknown types yield
    /// an empty list.
    async fn history(
        &self,
        entity_type: &str,
        entity_id: &str,
        schema: &str,
    ) -> DomainResult<Vec<AuditRecord>>;
}
