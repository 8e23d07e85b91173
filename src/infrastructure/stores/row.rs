// src/infrastructure/stores/row.rs
use crate::domain::audit::AuditRecord;
use std::borrow::Cow;
use tracing::warn;

pub const ENTITY_TYPE_MAX: usize = 250;
pub const ENTITY_ID_MAX: usize = 128;
pub const OPERATION_MAX: usize = 50;
pub const USER_ID_MAX: usize = 20;
pub const USER_EMAIL_MAX: usize = 150;

/// Copy of `record` whose text columns fit the audit table widths.
/// Over-long values are cut on a char boundary.
pub fn fit_to_columns(record: &AuditRecord) -> AuditRecord {
    AuditRecord {
        id: record.id,
        entity_type: truncate("entity_type", &record.entity_type, ENTITY_TYPE_MAX).into_owned(),
        entity_id: truncate("entity_id", &record.entity_id, ENTITY_ID_MAX).into_owned(),
        operation: record.operation,
        user_id: truncate("user_id", &record.user_id, USER_ID_MAX).into_owned(),
        user_email: record
            .user_email
            .as_deref()
            .map(|email| truncate("user_email", email, USER_EMAIL_MAX).into_owned()),
        created_at: record.created_at,
        changes: record.changes.clone(),
    }
}

/// `entity_id` as the column stores it; history lookups filter on this.
pub fn fit_entity_id(entity_id: &str) -> Cow<'_, str> {
    truncate("entity_id", entity_id, ENTITY_ID_MAX)
}

pub fn fit_entity_type(entity_type: &str) -> Cow<'_, str> {
    truncate("entity_type", entity_type, ENTITY_TYPE_MAX)
}

fn truncate<'a>(column: &'static str, value: &'a str, max: usize) -> Cow<'a, str> {
    match value.char_indices().nth(max) {
        None => Cow::Borrowed(value),
        Some((cut, _)) => {
            warn!(column, max, "audit value truncated to column width");
            Cow::Borrowed(&value[..cut])
        }
    }
}
