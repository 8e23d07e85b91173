// src/infrastructure/stores/memory.rs
use super::{audit_table_for, history_keys, row::fit_to_columns};
use crate::domain::{
    audit::{AuditRecord, AuditStore, SaveOutcome},
    errors::{DomainError, DomainResult},
    schema::{AuditTableMapping, AuditTableRegistry, BackendRegistry, qualify},
    sync::lock,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
};
use tracing::{debug, instrument, warn};

/// One in-process "database": audit tables plus an id sequence.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<AuditRecord>>>,
    last_id: AtomicI64,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `StorageUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Rows of `schema.audit_table` in insertion order.
    pub fn rows(&self, schema: &str, audit_table: &str) -> Vec<AuditRecord> {
        lock(&self.tables)
            .get(&table_key(schema, audit_table))
            .cloned()
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        lock(&self.tables).values().map(Vec::len).sum()
    }

    fn ensure_online(&self, schema: &str) -> DomainResult<()> {
        if self.is_offline() {
            return Err(DomainError::storage_unavailable(schema, "backend is offline"));
        }
        Ok(())
    }
}

fn table_key(schema: &str, audit_table: &str) -> String {
    qualify(schema, audit_table).to_lowercase()
}

fn mapping_key(mapping: &AuditTableMapping) -> String {
    table_key(&mapping.schema, &mapping.audit_table)
}

/// Reference store keeping audit tables in memory, one backend per schema.
pub struct InMemoryAuditStore {
    backends: BackendRegistry<Arc<MemoryBackend>>,
    audit_tables: Arc<AuditTableRegistry>,
}

impl InMemoryAuditStore {
    pub fn new(audit_tables: Arc<AuditTableRegistry>) -> Self {
        Self {
            backends: BackendRegistry::new(),
            audit_tables,
        }
    }

    /// Backend for `schema`, created on first call.
    pub fn add_schema(&self, schema: &str) -> Arc<MemoryBackend> {
        if let Some(existing) = self.backends.get(schema) {
            return existing;
        }
        let backend = Arc::new(MemoryBackend::new());
        self.backends.register(schema, Arc::clone(&backend));
        backend
    }

    pub fn backend(&self, schema: &str) -> Option<Arc<MemoryBackend>> {
        self.backends.get(schema)
    }

    pub fn backends(&self) -> &BackendRegistry<Arc<MemoryBackend>> {
        &self.backends
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn save(&self, records: &[AuditRecord], schema: &str) -> DomainResult<SaveOutcome> {
        let backend = self.backends.resolve(schema)?;
        backend.ensure_online(schema)?;

        let mut outcome = SaveOutcome::default();
        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            match audit_table_for(&self.audit_tables, &record.entity_type) {
                Some(mapping) => staged.push((mapping_key(&mapping), fit_to_columns(record))),
                None => {
                    let err = DomainError::UnresolvableAuditTable(record.entity_type.clone());
                    warn!(error = %err, entity_id = %record.entity_id, "skipping audit record");
                    outcome.skipped += 1;
                }
            }
        }

        // ids are drawn under the table lock so they follow insertion order
        let mut tables = lock(&backend.tables);
        for (table, mut row) in staged {
            row.id = Some(backend.last_id.fetch_add(1, Ordering::SeqCst) + 1);
            tables.entry(table).or_default().push(row);
            outcome.persisted += 1;
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        entity_type: &str,
        entity_id: &str,
        schema: &str,
    ) -> DomainResult<Vec<AuditRecord>> {
        let Some(mapping) = audit_table_for(&self.audit_tables, entity_type) else {
            debug!("no audit table mapped; empty history");
            return Ok(Vec::new());
        };
        let backend = self.backends.resolve(schema)?;
        backend.ensure_online(schema)?;
        let (entity_type, entity_id) = history_keys(&mapping, entity_type, entity_id);

        let mut rows: Vec<AuditRecord> = lock(&backend.tables)
            .get(&mapping_key(&mapping))
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.entity_id == entity_id && row.entity_type.eq_ignore_ascii_case(&entity_type)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::{ChangeSet, EntityTypeId, FieldChange, Operation};
    use crate::domain::schema::SchemaInfo;
    use crate::infrastructure::stores::row::ENTITY_ID_MAX;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn store() -> (InMemoryAuditStore, Arc<MemoryBackend>) {
        let audit_tables = Arc::new(AuditTableRegistry::new());
        audit_tables.register(&EntityTypeId::new("Invoice").unwrap(), "dbo", "Invoice_Audit");
        let store = InMemoryAuditStore::new(audit_tables);
        let backend = store.add_schema("dbo");
        (store, backend)
    }

    fn record(entity_type: &str, entity_id: &str, minutes: i64) -> AuditRecord {
        let mut changes = ChangeSet::new();
        changes.insert("Amount", FieldChange::new(json!(null), json!(minutes)));
        AuditRecord {
            id: None,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            operation: Operation::Created,
            user_id: "system".into(),
            user_email: Some("system".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
            changes,
        }
    }

    #[tokio::test]
    async fn unmapped_records_are_skipped_and_the_rest_saved() {
        let (store, backend) = store();
        let outcome = store
            .save(
                &[record("dbo.Invoice", "1", 0), record("dbo.Ghost", "1", 0)],
                "dbo",
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome { persisted: 1, skipped: 1 });
        let rows = backend.rows("dbo", "Invoice_Audit");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, Some(1));
    }

    #[tokio::test]
    async fn history_is_newest_first_with_id_tiebreak() {
        let (store, _) = store();
        store
            .save(
                &[
                    record("dbo.Invoice", "7", 1),
                    record("dbo.Invoice", "7", 3),
                    record("dbo.Invoice", "8", 5),
                    record("dbo.Invoice", "7", 3),
                ],
                "dbo",
            )
            .await
            .unwrap();

        let history = store.history("DBO.INVOICE", "7", "dbo").await.unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(4), Some(2), Some(1)]);
    }

    #[tokio::test]
    async fn unknown_type_history_is_empty_and_offline_backend_fails() {
        let (store, backend) = store();
        assert!(store.history("dbo.Ghost", "1", "dbo").await.unwrap().is_empty());

        backend.set_offline(true);
        let err = store
            .save(&[record("dbo.Invoice", "1", 0)], "dbo")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StorageUnavailable { .. }));
        assert_eq!(backend.row_count(), 0);
    }

    #[tokio::test]
    async fn missing_backend_is_storage_unavailable() {
        let (store, _) = store();
        let err = store
            .save(&[record("dbo.Invoice", "1", 0)], "hr")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StorageUnavailable { schema, .. } if schema == "hr"));
    }

    #[tokio::test]
    async fn history_accepts_every_form_of_the_entity_name() {
        let audit_tables = Arc::new(AuditTableRegistry::new());
        audit_tables.register_schema_info(
            &EntityTypeId::new("Invoice").unwrap(),
            &SchemaInfo::new("dbo", "Invoices", "Invoice"),
        );
        let store = InMemoryAuditStore::new(audit_tables);
        store.add_schema("dbo");
        store
            .save(&[record("dbo.Invoices", "7", 0)], "dbo")
            .await
            .unwrap();

        for name in ["dbo.Invoices", "DBO.invoices", "dbo.Invoices_Audit", "dbo.Invoice"] {
            let history = store.history(name, "7", "dbo").await.unwrap();
            assert_eq!(history.len(), 1, "history via {name}");
        }
    }

    #[tokio::test]
    async fn over_long_entity_ids_are_found_after_truncation() {
        let (store, backend) = store();
        let long_id = format!("{}|{}", "a".repeat(90), "b".repeat(50));
        store
            .save(&[record("dbo.Invoice", &long_id, 0)], "dbo")
            .await
            .unwrap();
        assert_eq!(
            backend.rows("dbo", "Invoice_Audit")[0].entity_id.chars().count(),
            ENTITY_ID_MAX
        );

        let history = store.history("dbo.Invoice", &long_id, "dbo").await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
