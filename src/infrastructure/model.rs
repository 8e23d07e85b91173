// src/infrastructure/model.rs
use crate::domain::{
    audit::{Auditable, EntityTypeId},
    errors::{DomainError, DomainResult},
    schema::{ModelMetadata, TableDeclaration},
    sync::{read, write},
};
use serde::Deserialize;
use std::{collections::HashMap, path::Path, sync::RwLock};

/// One entry of a JSON model document: `{"entity", "schema"?, "table"?}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityDeclaration {
    entity: String,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    table: Option<String>,
}

/// In-process model metadata, declared at startup or loaded from JSON.
#[derive(Default)]
pub struct StaticModelMetadata {
    tables: RwLock<HashMap<EntityTypeId, TableDeclaration>>,
}

impl StaticModelMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later declarations for the same entity replace earlier ones.
    pub fn declare(
        &self,
        entity_type: &EntityTypeId,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> &Self {
        let declaration = TableDeclaration::new(
            non_blank(schema).map(str::to_owned),
            non_blank(table).map(str::to_owned),
        );
        write(&self.tables).insert(entity_type.clone(), declaration);
        self
    }

    pub fn declare_entity<T: Auditable>(&self, schema: Option<&str>, table: Option<&str>) -> &Self {
        self.declare(&EntityTypeId::of::<T>(), schema, table)
    }

    pub fn from_json(raw: &str) -> DomainResult<Self> {
        let declarations: Vec<EntityDeclaration> = serde_json::from_str(raw)
            .map_err(|err| DomainError::Validation(format!("invalid model document: {err}")))?;

        let metadata = Self::new();
        for declaration in declarations {
            let entity_type = EntityTypeId::new(&declaration.entity)?;
            metadata.declare(
                &entity_type,
                declaration.schema.as_deref(),
                declaration.table.as_deref(),
            );
        }
        Ok(metadata)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DomainError::Validation(format!("cannot read model file {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Declared entity types, sorted.
    pub fn entities(&self) -> Vec<EntityTypeId> {
        let mut entities: Vec<_> = read(&self.tables).keys().cloned().collect();
        entities.sort();
        entities
    }
}

impl ModelMetadata for StaticModelMetadata {
    fn table_for(&self, entity_type: &EntityTypeId) -> Option<TableDeclaration> {
        read(&self.tables).get(entity_type).cloned()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_declarations_from_json() {
        let metadata = StaticModelMetadata::from_json(
            r#"[
                {"entity": "Invoice", "schema": "Billing", "table": "Invoices"},
                {"entity": "Customer"}
            ]"#,
        )
        .unwrap();

        let invoice = EntityTypeId::new("Invoice").unwrap();
        let customer = EntityTypeId::new("Customer").unwrap();
        assert_eq!(metadata.entities(), vec![customer.clone(), invoice.clone()]);
        assert_eq!(
            metadata.table_for(&invoice),
            Some(TableDeclaration::new(
                Some("Billing".into()),
                Some("Invoices".into())
            ))
        );
        assert_eq!(metadata.table_for(&customer), Some(TableDeclaration::default()));
        assert_eq!(
            metadata.table_for(&EntityTypeId::new("Order").unwrap()),
            None
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            StaticModelMetadata::from_json(r#"{"entity": "Invoice"}"#),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            StaticModelMetadata::from_json(r#"[{"entity": "  "}]"#),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn blank_parts_fall_back_to_defaults() {
        let metadata = StaticModelMetadata::new();
        let order = EntityTypeId::new("Order").unwrap();
        metadata.declare(&order, Some(" "), Some("Orders"));
        assert_eq!(
            metadata.table_for(&order),
            Some(TableDeclaration::new(None, Some("Orders".into())))
        );
    }
}
