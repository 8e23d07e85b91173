// src/domain/schema/info.rs
use crate::domain::audit::EntityTypeId;

pub const DEFAULT_SCHEMA: &str = "dbo";
pub const AUDIT_TABLE_SUFFIX: &str = "_Audit";

/// Schema and table an entity type is mapped to, derived once per type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaInfo {
    pub schema: String,
    pub table_name: String,
    pub entity_name: String,
}

impl SchemaInfo {
    pub fn new(
        schema: impl Into<String>,
        table_name: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table_name: table_name.into(),
            entity_name: entity_name.into(),
        }
    }

    /// `schema.tableName`, the value stored in `AuditRecord::entity_type`.
    pub fn qualified_name(&self) -> String {
        qualify(&self.schema, &self.table_name)
    }

    pub fn audit_table_name(&self) -> String {
        audit_table_name(&self.table_name)
    }
}

pub fn qualify(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

pub fn audit_table_name(table: &str) -> String {
    format!("{table}{AUDIT_TABLE_SUFFIX}")
}

/// What the host model declares for an entity type. Missing parts fall back
/// to the default schema and the entity type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDeclaration {
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl TableDeclaration {
    pub fn new(schema: Option<String>, table: Option<String>) -> Self {
        Self { schema, table }
    }
}

/// Schema/table declaration source owned by the host's mapping layer.
pub trait ModelMetadata: Send + Sync {
    /// `None` means the type is not part of the model.
    fn table_for(&self, entity_type: &EntityTypeId) -> Option<TableDeclaration>;
}
