// src/application/capture/diff.rs
use crate::application::ports::{actor::ActorContext, time::Clock};
use crate::domain::{
    audit::{
        ActorIdentity, AuditRecord, ChangeSet, FieldChange, FieldState,
        IgnoreConfiguration, Operation, TrackedMutation,
    },
    errors::DomainResult,
    schema::{AuditTableRegistry, SchemaRegistry},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns tracked mutations into audit records.
///
/// Pure and synchronous: no I/O, no suspension. One record per auditable
/// mutation, in input order.
pub struct DiffEngine {
    schemas: Arc<SchemaRegistry>,
    audit_tables: Arc<AuditTableRegistry>,
    ignore: Arc<IgnoreConfiguration>,
    actor: Arc<dyn ActorContext>,
    clock: Arc<dyn Clock>,
}

impl DiffEngine {
    pub fn new(
        schemas: Arc<SchemaRegistry>,
        audit_tables: Arc<AuditTableRegistry>,
        ignore: Arc<IgnoreConfiguration>,
        actor: Arc<dyn ActorContext>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schemas,
            audit_tables,
            ignore,
            actor,
            clock,
        }
    }

    /// Fails as a whole when any mutation's type cannot be resolved.
    pub fn capture(&self, mutations: &[TrackedMutation]) -> DomainResult<Vec<AuditRecord>> {
        if mutations.is_empty() {
            return Ok(Vec::new());
        }

        let (user_id, user_email) = self.current_actor().or_system();
        let captured_at = self.clock.now();

        let mut records = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            if let Some(record) = self.capture_one(mutation, &user_id, &user_email, captured_at)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn capture_one(
        &self,
        mutation: &TrackedMutation,
        user_id: &str,
        user_email: &str,
        captured_at: DateTime<Utc>,
    ) -> DomainResult<Option<AuditRecord>> {
        let entity_type = mutation.entity_type();
        if self.ignore.should_ignore_entity(mutation) {
            debug!(entity_type = %entity_type, "entity excluded by conditional rule");
            return Ok(None);
        }

        let info = self.schemas.resolve(entity_type)?;
        self.audit_tables.register_schema_info(entity_type, &info);

        let changes = compute_changes(mutation.operation(), mutation.fields(), |field| {
            self.ignore.should_ignore_field(entity_type, field)
        });
        if changes.is_empty() {
            debug!(
                entity_type = %entity_type,
                operation = %mutation.operation(),
                "no auditable changes"
            );
            return Ok(None);
        }

        Ok(Some(AuditRecord {
            id: None,
            entity_type: info.qualified_name(),
            entity_id: mutation.entity_id(),
            operation: mutation.operation(),
            user_id: user_id.to_string(),
            user_email: Some(user_email.to_string()),
            created_at: captured_at,
            changes,
        }))
    }

    fn current_actor(&self) -> ActorIdentity {
        match self.actor.current_actor() {
            Ok(Some(actor)) => actor,
            Ok(None) => ActorIdentity::default(),
            Err(err) => {
                warn!(error = %err, "actor context failed, auditing as system");
                ActorIdentity::default()
            }
        }
    }
}

/// Per-operation diff policy:
/// created keeps non-null current values, deleted keeps non-null original
/// values, updated keeps every dirty field as-is.
pub fn compute_changes(
    operation: Operation,
    fields: &[FieldState],
    is_ignored: impl Fn(&str) -> bool,
) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for field in fields.iter().filter(|field| !is_ignored(&field.name)) {
        let change = match operation {
            Operation::Created if !field.current.is_null() => {
                FieldChange::new(serde_json::Value::Null, field.current.clone())
            }
            Operation::Deleted if !field.original.is_null() => {
                FieldChange::new(field.original.clone(), serde_json::Value::Null)
            }
            Operation::Updated if field.dirty => {
                FieldChange::new(field.original.clone(), field.current.clone())
            }
            _ => continue,
        };
        changes.insert(field.name.clone(), change);
    }
    changes
}
