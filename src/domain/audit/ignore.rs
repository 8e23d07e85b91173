// src/domain/audit/ignore.rs
use super::entity_type::{Auditable, EntityTypeId};
use super::mutation::{EntitySnapshot, TrackedMutation};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::sync::{read, write};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::debug;

pub type EntityPredicate = Arc<dyn Fn(&EntitySnapshot<'_>) -> bool + Send + Sync>;

/// Declarative exclusion rules: per-type ignored fields and at most one
/// whole-entity predicate per type.
///
/// Field names compare case-insensitively. A second `ignore_when` for the
/// same type replaces the first.
#[derive(Default)]
pub struct IgnoreConfiguration {
    fields: RwLock<HashMap<EntityTypeId, HashSet<String>>>,
    predicates: RwLock<HashMap<EntityTypeId, EntityPredicate>>,
}

impl IgnoreConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds field exclusions for `entity_type`, merging with earlier calls.
    pub fn ignore_fields<I, S>(&self, entity_type: &EntityTypeId, fields: I) -> DomainResult<&Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = fields
            .into_iter()
            .map(|field| normalize_field(entity_type, field.as_ref()))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut guard = write(&self.fields);
        let set = guard.entry(entity_type.clone()).or_default();
        set.extend(names);
        debug!(entity_type = %entity_type, ignored = set.len(), "field ignore rules updated");
        Ok(self)
    }

    /// Like [`ignore_fields`](Self::ignore_fields) but rejects names that are
    /// not among `T::FIELDS` or `T::KEY_FIELDS`.
    pub fn ignore_fields_of<T: Auditable>(&self, fields: &[&str]) -> DomainResult<&Self> {
        for field in fields {
            let known = T::FIELDS
                .iter()
                .chain(T::KEY_FIELDS)
                .any(|candidate| candidate.eq_ignore_ascii_case(field.trim()));
            if !known {
                return Err(DomainError::InvalidIgnoreExpression(format!(
                    "'{field}' is not a field of {}",
                    T::ENTITY_TYPE
                )));
            }
        }
        self.ignore_fields(&EntityTypeId::of::<T>(), fields.iter().copied())
    }

    pub fn ignore_when<F>(&self, entity_type: &EntityTypeId, predicate: F) -> &Self
    where
        F: Fn(&EntitySnapshot<'_>) -> bool + Send + Sync + 'static,
    {
        let replaced = write(&self.predicates)
            .insert(entity_type.clone(), Arc::new(predicate))
            .is_some();
        if replaced {
            debug!(entity_type = %entity_type, "conditional ignore rule replaced");
        }
        self
    }

    pub fn should_ignore_field(&self, entity_type: &EntityTypeId, field: &str) -> bool {
        read(&self.fields)
            .get(entity_type)
            .is_some_and(|set| set.contains(&field.to_lowercase()))
    }

    pub fn should_ignore_entity(&self, mutation: &TrackedMutation) -> bool {
        // clone the predicate out so user code never runs under the lock
        let predicate = read(&self.predicates).get(mutation.entity_type()).cloned();
        predicate.is_some_and(|predicate| predicate(&mutation.snapshot()))
    }

    pub fn has_predicate(&self, entity_type: &EntityTypeId) -> bool {
        read(&self.predicates).contains_key(entity_type)
    }

    pub fn ignored_fields(&self, entity_type: &EntityTypeId) -> Vec<String> {
        let mut fields: Vec<_> = read(&self.fields)
            .get(entity_type)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        fields.sort();
        fields
    }

    pub fn clear(&self) {
        write(&self.fields).clear();
        write(&self.predicates).clear();
    }
}

fn normalize_field(entity_type: &EntityTypeId, field: &str) -> DomainResult<String> {
    let trimmed = field.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(DomainError::InvalidIgnoreExpression(format!(
            "'{field}' does not name a field of {entity_type}"
        )));
    }
    Ok(trimmed.to_lowercase())
}
