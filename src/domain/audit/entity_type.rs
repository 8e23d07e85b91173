// src/domain/audit/entity_type.rs
use crate::domain::errors::{DomainError, DomainResult};
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc};

/// Type tag identifying an auditable entity type (e.g. `Invoice`).
///
/// Cloning is cheap; the tag is the key of every registry in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(Arc<str>);

impl EntityTypeId {
    pub fn new(name: impl AsRef<str>) -> DomainResult<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "entity type name cannot be empty".into(),
            ));
        }
        Ok(Self(Arc::from(name)))
    }

    pub fn of<T: Auditable>() -> Self {
        Self(Arc::from(T::ENTITY_TYPE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityTypeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Implemented by host entities that want typed mutation snapshots.
///
/// `KEY_FIELDS` and `key_values` describe the primary key in declared order;
/// `FIELDS` and `field_values` cover the remaining mapped columns.
pub trait Auditable: Send + Sync + 'static {
    const ENTITY_TYPE: &'static str;
    const KEY_FIELDS: &'static [&'static str];
    const FIELDS: &'static [&'static str];

    fn key_values(&self) -> Vec<Value>;

    fn field_values(&self) -> Vec<(&'static str, Value)>;
}
