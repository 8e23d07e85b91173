// src/domain/audit/mutation.rs
use super::entity::Operation;
use super::entity_type::{Auditable, EntityTypeId};
use serde_json::Value;

pub const KEY_DELIMITER: &str = "|";

/// Original/current value of one mapped field as seen by the change tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub name: String,
    pub original: Value,
    pub current: Value,
    /// Only meaningful for `Updated` mutations.
    pub dirty: bool,
}

impl FieldState {
    pub fn new(name: impl Into<String>, original: Value, current: Value, dirty: bool) -> Self {
        Self {
            name: name.into(),
            original,
            current,
            dirty,
        }
    }
}

/// Normalised snapshot of one tracked entity at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMutation {
    entity_type: EntityTypeId,
    operation: Operation,
    keys: Vec<(String, Value)>,
    fields: Vec<FieldState>,
}

impl TrackedMutation {
    pub fn new(entity_type: EntityTypeId, operation: Operation) -> Self {
        Self {
            entity_type,
            operation,
            keys: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Appends a primary-key component; call in declared key order.
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keys.push((name.into(), value.into()));
        self
    }

    pub fn with_field(mut self, field: FieldState) -> Self {
        self.fields.push(field);
        self
    }

    /// Field of a newly added entity: no original value.
    pub fn with_current(self, name: impl Into<String>, current: impl Into<Value>) -> Self {
        self.with_field(FieldState::new(name, Value::Null, current.into(), false))
    }

    /// Field of a removed entity: no current value.
    pub fn with_original(self, name: impl Into<String>, original: impl Into<Value>) -> Self {
        self.with_field(FieldState::new(name, original.into(), Value::Null, false))
    }

    pub fn with_change(
        self,
        name: impl Into<String>,
        original: impl Into<Value>,
        current: impl Into<Value>,
        dirty: bool,
    ) -> Self {
        self.with_field(FieldState::new(name, original.into(), current.into(), dirty))
    }

    pub fn created<T: Auditable>(entity: &T) -> Self {
        let mut mutation = Self::keyed::<T>(entity, Operation::Created);
        for (name, value) in entity.field_values() {
            mutation.fields.push(FieldState::new(name, Value::Null, value, false));
        }
        mutation
    }

    pub fn deleted<T: Auditable>(entity: &T) -> Self {
        let mut mutation = Self::keyed::<T>(entity, Operation::Deleted);
        for (name, value) in entity.field_values() {
            mutation.fields.push(FieldState::new(name, value, Value::Null, false));
        }
        mutation
    }

    /// Fields whose value differs between `original` and `current` are dirty.
    /// The key is taken from `current`.
    pub fn updated<T: Auditable>(original: &T, current: &T) -> Self {
        let mut mutation = Self::keyed::<T>(current, Operation::Updated);
        let before = original.field_values();
        for (name, after) in current.field_values() {
            let previous = before
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::Null);
            let dirty = previous != after;
            mutation.fields.push(FieldState::new(name, previous, after, dirty));
        }
        mutation
    }

    fn keyed<T: Auditable>(entity: &T, operation: Operation) -> Self {
        let keys = T::KEY_FIELDS
            .iter()
            .zip(entity.key_values())
            .map(|(name, value)| ((*name).to_string(), value))
            .collect();
        Self {
            entity_type: EntityTypeId::of::<T>(),
            operation,
            keys,
            fields: Vec::new(),
        }
    }

    pub fn entity_type(&self) -> &EntityTypeId {
        &self.entity_type
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn keys(&self) -> &[(String, Value)] {
        &self.keys
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    /// Primary key values joined with `|` in declared order.
    pub fn entity_id(&self) -> String {
        format_entity_id(self.keys.iter().map(|(_, value)| value))
    }

    pub fn snapshot(&self) -> EntitySnapshot<'_> {
        EntitySnapshot { mutation: self }
    }
}

pub fn format_entity_id<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(key_component)
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

fn key_component(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read-only view of an entity instance handed to conditional ignore rules.
///
/// Field lookups return the current value, except for deleted entities
/// where only the original value exists.
#[derive(Debug, Clone, Copy)]
pub struct EntitySnapshot<'a> {
    mutation: &'a TrackedMutation,
}

impl<'a> EntitySnapshot<'a> {
    pub fn entity_type(&self) -> &'a EntityTypeId {
        &self.mutation.entity_type
    }

    pub fn operation(&self) -> Operation {
        self.mutation.operation
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        if let Some((_, value)) = self
            .mutation
            .keys
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
        {
            return Some(value);
        }
        self.mutation
            .fields
            .iter()
            .find(|state| state.name.eq_ignore_ascii_case(field))
            .map(|state| match self.mutation.operation {
                Operation::Deleted => &state.original,
                Operation::Created | Operation::Updated => &state.current,
            })
    }

    pub fn original(&self, field: &str) -> Option<&'a Value> {
        self.mutation
            .fields
            .iter()
            .find(|state| state.name.eq_ignore_ascii_case(field))
            .map(|state| &state.original)
    }
}
