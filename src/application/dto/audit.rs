use crate::domain::audit::{AuditRecord, ChangeSet, Operation};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecordDto {
    pub id: Option<i64>,
    pub entity_type: String,
    pub entity_id: String,
    pub operation: Operation,
    pub user_id: String,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub changes: ChangeSet,
}

impl From<AuditRecord> for AuditRecordDto {
    fn from(a: AuditRecord) -> Self {
        Self {
            id: a.id,
            entity_type: a.entity_type,
            entity_id: a.entity_id,
            operation: a.operation,
            user_id: a.user_id,
            user_email: a.user_email,
            created_at: a.created_at,
            changes: a.changes,
        }
    }
}
