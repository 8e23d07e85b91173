// src/infrastructure/stores/postgres.rs
use super::{
    audit_table_for, history_keys,
    error::map_sqlx,
    identifiers::{history_index_name, qualified_table, quote_ident},
    row::{ENTITY_ID_MAX, ENTITY_TYPE_MAX, OPERATION_MAX, USER_EMAIL_MAX, USER_ID_MAX, fit_to_columns},
};
use crate::domain::{
    audit::{AuditRecord, AuditStore, ChangeSet, SaveOutcome},
    errors::{DomainError, DomainResult},
    schema::{AuditTableMapping, AuditTableRegistry, BackendRegistry},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Audit store writing `"<schema>"."<Table>_Audit"` tables, one pool per
/// schema.
pub struct PostgresAuditStore {
    pools: BackendRegistry<PgPool>,
    audit_tables: Arc<AuditTableRegistry>,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: i64,
    entity_type: String,
    entity_id: String,
    operation: String,
    user_id: String,
    user_email: Option<String>,
    created_at: DateTime<Utc>,
    changes: String,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = DomainError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let changes = ChangeSet::from_json(&row.changes).map_err(|err| {
            DomainError::Persistence(format!("audit row {} has malformed changes: {err}", row.id))
        })?;
        Ok(AuditRecord {
            id: Some(row.id),
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            operation: row.operation.parse()?,
            user_id: row.user_id,
            user_email: row.user_email,
            created_at: row.created_at,
            changes,
        })
    }
}

impl PostgresAuditStore {
    pub fn new(audit_tables: Arc<AuditTableRegistry>) -> Self {
        Self {
            pools: BackendRegistry::new(),
            audit_tables,
        }
    }

    pub fn register_pool(&self, schema: &str, pool: PgPool) {
        self.pools.register(schema, pool);
    }

    pub fn pools(&self) -> &BackendRegistry<PgPool> {
        &self.pools
    }

    /// Creates the schema, the audit table and its history index if missing.
    #[instrument(skip(self, mapping), fields(schema = %mapping.schema, audit_table = %mapping.audit_table))]
    pub async fn ensure_audit_table(&self, mapping: &AuditTableMapping) -> DomainResult<()> {
        let schema = mapping.schema.as_str();
        let pool = self.pools.resolve(schema)?;
        let table = qualified_table(schema, &mapping.audit_table)?;
        let index = quote_ident(&history_index_name(&mapping.audit_table))?;

        let statements = [
            format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)?),
            format!(
                r#"CREATE TABLE IF NOT EXISTS {table} (
                    "Id" BIGSERIAL PRIMARY KEY,
                    "EntityType" VARCHAR({ENTITY_TYPE_MAX}) NOT NULL,
                    "EntityId" VARCHAR({ENTITY_ID_MAX}) NOT NULL,
                    "Operation" VARCHAR({OPERATION_MAX}) NOT NULL,
                    "UserId" VARCHAR({USER_ID_MAX}) NOT NULL,
                    "UserEmail" VARCHAR({USER_EMAIL_MAX}),
                    "CreatedAt" TIMESTAMPTZ NOT NULL,
                    "Changes" TEXT NOT NULL
                )"#
            ),
            format!(
                r#"CREATE INDEX IF NOT EXISTS {index}
                   ON {table} ("EntityId", "CreatedAt", "UserId", "UserEmail")"#
            ),
        ];

        for statement in &statements {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|err| map_sqlx(schema, err))?;
        }
        debug!("audit table ready");
        Ok(())
    }

    /// Provisions every registered audit table whose schema has a pool.
    /// Returns how many tables were provisioned.
    pub async fn ensure_audit_tables(&self) -> DomainResult<usize> {
        let mut provisioned = 0;
        for (entity_type, mapping) in self.audit_tables.entries() {
            if !self.pools.contains(&mapping.schema) {
                warn!(entity_type = %entity_type, schema = %mapping.schema, "no pool for audit table schema");
                continue;
            }
            self.ensure_audit_table(&mapping).await?;
            provisioned += 1;
        }
        info!(provisioned, "audit tables provisioned");
        Ok(provisioned)
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    /// All rows of the partition are written in one transaction.
    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn save(&self, records: &[AuditRecord], schema: &str) -> DomainResult<SaveOutcome> {
        let pool = self.pools.resolve(schema)?;

        let mut outcome = SaveOutcome::default();
        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let Some(mapping) = audit_table_for(&self.audit_tables, &record.entity_type) else {
                let err = DomainError::UnresolvableAuditTable(record.entity_type.clone());
                warn!(error = %err, entity_id = %record.entity_id, "skipping audit record");
                outcome.skipped += 1;
                continue;
            };
            let table = qualified_table(&mapping.schema, &mapping.audit_table)?;
            let row = fit_to_columns(record);
            let changes = row.changes.to_json().map_err(|err| {
                DomainError::Persistence(format!("cannot encode audit changes: {err}"))
            })?;
            staged.push((table, row, changes));
        }

        if staged.is_empty() {
            return Ok(outcome);
        }

        let mut tx = pool.begin().await.map_err(|err| map_sqlx(schema, err))?;
        for (table, row, changes) in &staged {
            let sql = format!(
                r#"INSERT INTO {table}
                   ("EntityType", "EntityId", "Operation", "UserId", "UserEmail", "CreatedAt", "Changes")
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#
            );
            sqlx::query(&sql)
                .bind(&row.entity_type)
                .bind(&row.entity_id)
                .bind(row.operation.as_str())
                .bind(&row.user_id)
                .bind(row.user_email.as_deref())
                .bind(row.created_at)
                .bind(changes)
                .execute(&mut *tx)
                .await
                .map_err(|err| map_sqlx(schema, err))?;
            outcome.persisted += 1;
        }
        tx.commit().await.map_err(|err| map_sqlx(schema, err))?;

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
        let pool = self.pools.resolve(schema)?;
        let table = qualified_table(&mapping.schema, &mapping.audit_table)?;
        let (entity_type, entity_id) = history_keys(&mapping, entity_type, entity_id);

        let sql = format!(
            r#"SELECT "Id" AS id, "EntityType" AS entity_type, "EntityId" AS entity_id,
                      "Operation" AS operation, "UserId" AS user_id, "UserEmail" AS user_email,
                      "CreatedAt" AS created_at, "Changes" AS changes
               FROM {table}
               WHERE lower("EntityType") = lower($1) AND "EntityId" = $2
               ORDER BY "CreatedAt" DESC, "Id" DESC"#
        );
        let rows = sqlx::query_as::<_, AuditRow>(&sql)
            .bind(&entity_type)
            .bind(&entity_id)
            .fetch_all(&pool)
            .await
            .map_err(|err| map_sqlx(schema, err))?;

        rows.into_iter().map(AuditRecord::try_from).collect()
    }
}
