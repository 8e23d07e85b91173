// tests/support/mocks/store.rs
use async_trait::async_trait;
use change_audit::domain::audit::{AuditRecord, AuditStore, SaveOutcome};
use change_audit::domain::errors::{DomainError, DomainResult};
use std::time::Duration;

/// Every call fails with `StorageUnavailable`.
pub struct FailingStore;

#[async_trait]
impl AuditStore for FailingStore {
    async fn save(&self, _records: &[AuditRecord], schema: &str) -> DomainResult<SaveOutcome> {
        Err(DomainError::storage_unavailable(schema, "connection refused"))
    }

    async fn history(
        &self,
        _entity_type: &str,
        _entity_id: &str,
        schema: &str,
    ) -> DomainResult<Vec<AuditRecord>> {
        Err(DomainError::storage_unavailable(schema, "connection refused"))
    }
}

/// Never answers within any reasonable timeout.
pub struct SlowStore(pub Duration);

#[async_trait]
impl AuditStore for SlowStore {
    async fn save(&self, records: &[AuditRecord], _schema: &str) -> DomainResult<SaveOutcome> {
        tokio::time::sleep(self.0).await;
        Ok(SaveOutcome {
            persisted: records.len(),
            skipped: 0,
        })
    }

    async fn history(
        &self,
        _entity_type: &str,
        _entity_id: &str,
        _schema: &str,
    ) -> DomainResult<Vec<AuditRecord>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}
