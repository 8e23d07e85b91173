// src/domain/audit/entity.rs
use crate::domain::errors::DomainError;
use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::Value;
use std::{fmt, str::FromStr};

pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Created => "Created",
            Operation::Updated => "Updated",
            Operation::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Operation::Created),
            "Updated" => Ok(Operation::Updated),
            "Deleted" => Ok(Operation::Deleted),
            other => Err(DomainError::Validation(format!(
                "unknown audit operation '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(rename = "old")]
    pub old_value: Value,
    #[serde(rename = "new")]
    pub new_value: Value,
}

impl FieldChange {
    pub fn new(old_value: Value, new_value: Value) -> Self {
        Self {
            old_value,
            new_value,
        }
    }
}

/// Field-level diff of one entity, kept in field declaration order.
///
/// Serialises as a JSON object `{field: {"old": .., "new": ..}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(Vec<(String, FieldChange)>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserting a field twice replaces the earlier change in place.
    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = change,
            None => self.0.push((field, change)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, change)| change)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.0.iter().map(|(name, change)| (name.as_str(), change))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, change) in &self.0 {
            map.serialize_entry(field, change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChangeSetVisitor;

        impl<'de> Visitor<'de> for ChangeSetVisitor {
            type Value = ChangeSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field name to {old, new}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ChangeSet, A::Error> {
                let mut changes = ChangeSet::new();
                while let Some((field, change)) = access.next_entry::<String, FieldChange>()? {
                    changes.insert(field, change);
                }
                Ok(changes)
            }
        }

        deserializer.deserialize_map(ChangeSetVisitor)
    }
}

/// Identity of whoever performed the audited mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorIdentity {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

impl ActorIdentity {
    pub fn new(user_id: impl Into<String>, user_email: Option<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_email,
        }
    }

    pub fn system() -> Self {
        Self {
            user_id: Some(SYSTEM_ACTOR.into()),
            user_email: Some(SYSTEM_ACTOR.into()),
        }
    }

    /// Missing parts fall back to the `system` sentinel independently.
    pub fn or_system(self) -> (String, String) {
        (
            self.user_id.unwrap_or_else(|| SYSTEM_ACTOR.into()),
            self.user_email.unwrap_or_else(|| SYSTEM_ACTOR.into()),
        )
    }
}

/// One persisted audit row. Write-once: nothing in the crate mutates a
/// record after the store assigned its `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: Option<i64>,
    /// Qualified `schema.table` name of the audited entity.
    pub entity_type: String,
    pub entity_id: String,
    pub operation: Operation,
    pub user_id: String,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub changes: ChangeSet,
}
