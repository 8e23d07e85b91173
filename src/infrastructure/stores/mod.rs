// src/infrastructure/stores/mod.rs
pub mod error;
pub mod identifiers;
pub mod memory;
pub mod postgres;
pub mod row;

pub use error::map_sqlx;
pub use memory::{InMemoryAuditStore, MemoryBackend};
pub use postgres::PostgresAuditStore;

use crate::domain::schema::{AuditTableMapping, AuditTableRegistry};

/// Physical audit table behind a record's qualified entity type.
fn audit_table_for(audit_tables: &AuditTableRegistry, qualified: &str) -> Option<AuditTableMapping> {
    audit_tables.lookup(qualified).map(|(_, mapping)| mapping)
}

/// `(EntityType, EntityId)` values stored rows carry for a history request.
/// Any accepted form of the name maps to the `schema.table` written at
/// capture, and both values are cut to the column widths used on save.
fn history_keys(mapping: &AuditTableMapping, requested: &str, entity_id: &str) -> (String, String) {
    let entity_type = mapping
        .source_qualified_name()
        .unwrap_or_else(|| requested.to_owned());
    (
        row::fit_entity_type(&entity_type).into_owned(),
        row::fit_entity_id(entity_id).into_owned(),
    )
}
