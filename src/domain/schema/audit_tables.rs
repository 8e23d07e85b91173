// src/domain/schema/audit_tables.rs
use super::info::{SchemaInfo, qualify};
use crate::domain::audit::EntityTypeId;
use crate::domain::sync::{read, write};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Physical audit table of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTableMapping {
    pub schema: String,
    pub audit_table: String,
    /// Table of the audited entity itself, when known.
    pub source_table: Option<String>,
}

impl AuditTableMapping {
    /// Case-insensitive match of `schema.name`. Table names (audit or source)
    /// rank before the entity type name fallback; `None` means no match.
    fn match_rank(&self, entity_type: &EntityTypeId, qualified: &str) -> Option<MatchRank> {
        let (schema, name) = qualified.split_once('.')?;
        if !eq_ignore_case(schema, &self.schema) {
            return None;
        }
        let table_match = eq_ignore_case(name, &self.audit_table)
            || self
                .source_table
                .as_deref()
                .is_some_and(|table| eq_ignore_case(name, table));
        if table_match {
            Some(MatchRank::Table)
        } else if eq_ignore_case(name, entity_type.as_str()) {
            Some(MatchRank::TypeName)
        } else {
            None
        }
    }

    /// `schema.source_table`, the entity type stamped on captured records.
    pub fn source_qualified_name(&self) -> Option<String> {
        self.source_table
            .as_deref()
            .map(|table| qualify(&self.schema, table))
    }

    /// Qualified names this mapping answers to.
    fn names(&self, entity_type: &EntityTypeId) -> Vec<String> {
        let mut names = vec![
            qualify(&self.schema, &self.audit_table),
            qualify(&self.schema, entity_type.as_str()),
        ];
        names.extend(self.source_qualified_name());
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Table,
    TypeName,
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Entity type → audit table registry with reverse lookup by qualified name.
///
/// Registration is first-wins: re-registering a type is a no-op.
#[derive(Default)]
pub struct AuditTableRegistry {
    mappings: RwLock<HashMap<EntityTypeId, AuditTableMapping>>,
}

impl AuditTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the mapping was newly added.
    pub fn register(
        &self,
        entity_type: &EntityTypeId,
        schema: impl Into<String>,
        audit_table: impl Into<String>,
    ) -> bool {
        self.insert(
            entity_type,
            AuditTableMapping {
                schema: schema.into(),
                audit_table: audit_table.into(),
                source_table: None,
            },
        )
    }

    /// Registers `<table>_Audit` in the entity's own schema.
    pub fn register_schema_info(&self, entity_type: &EntityTypeId, info: &SchemaInfo) -> bool {
        if read(&self.mappings).contains_key(entity_type) {
            return false;
        }
        self.insert(
            entity_type,
            AuditTableMapping {
                schema: info.schema.clone(),
                audit_table: info.audit_table_name(),
                source_table: Some(info.table_name.clone()),
            },
        )
    }

    fn insert(&self, entity_type: &EntityTypeId, mapping: AuditTableMapping) -> bool {
        let mut guard = write(&self.mappings);
        if guard.contains_key(entity_type) {
            return false;
        }
        for name in mapping.names(entity_type) {
            if let Some(other) = guard
                .iter()
                .find(|(other, existing)| existing.match_rank(other, &name).is_some())
                .map(|(other, _)| other)
            {
                warn!(
                    entity_type = %entity_type,
                    other = %other,
                    name = %name,
                    "qualified name is shared by two audited types; table names win over type names"
                );
            }
        }
        debug!(
            entity_type = %entity_type,
            schema = %mapping.schema,
            audit_table = %mapping.audit_table,
            "audit table registered"
        );
        guard.insert(entity_type.clone(), mapping);
        true
    }

    pub fn map(&self, entity_type: &EntityTypeId) -> Option<AuditTableMapping> {
        read(&self.mappings).get(entity_type).cloned()
    }

    pub fn schema_of(&self, qualified: &str) -> Option<String> {
        self.lookup(qualified).map(|(_, mapping)| mapping.schema)
    }

    pub fn resolve_type(&self, qualified: &str) -> Option<EntityTypeId> {
        self.lookup(qualified).map(|(entity_type, _)| entity_type)
    }

    /// Best match for `qualified`: table-name matches first, then the type
    /// name; ties go to the smallest entity type so the answer is stable.
    pub fn lookup(&self, qualified: &str) -> Option<(EntityTypeId, AuditTableMapping)> {
        read(&self.mappings)
            .iter()
            .filter_map(|(entity_type, mapping)| {
                mapping
                    .match_rank(entity_type, qualified)
                    .map(|rank| (rank, entity_type, mapping))
            })
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, entity_type, mapping)| (entity_type.clone(), mapping.clone()))
    }

    /// Registered mappings sorted by entity type.
    pub fn entries(&self) -> Vec<(EntityTypeId, AuditTableMapping)> {
        let mut entries: Vec<_> = read(&self.mappings)
            .iter()
            .map(|(entity_type, mapping)| (entity_type.clone(), mapping.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        read(&self.mappings).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        write(&self.mappings).clear();
    }
}
