// src/domain/schema/backends.rs
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::sync::{read, write};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Schema (tenant) → storage backend handle. Schema names compare
/// case-insensitively; a later registration for the same schema replaces
/// the handle.
pub struct BackendRegistry<B> {
    backends: RwLock<HashMap<String, B>>,
}

impl<B> Default for BackendRegistry<B> {
    fn default() -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
        }
    }
}

impl<B: Clone> BackendRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, schema: &str, backend: B) -> Option<B> {
        debug!(schema, "storage backend registered");
        write(&self.backends).insert(schema.to_lowercase(), backend)
    }

    pub fn get(&self, schema: &str) -> Option<B> {
        read(&self.backends).get(&schema.to_lowercase()).cloned()
    }

    pub fn resolve(&self, schema: &str) -> DomainResult<B> {
        self.get(schema).ok_or_else(|| {
            DomainError::storage_unavailable(schema, "no storage backend registered")
        })
    }

    pub fn contains(&self, schema: &str) -> bool {
        read(&self.backends).contains_key(&schema.to_lowercase())
    }

    pub fn schemas(&self) -> Vec<String> {
        let mut schemas: Vec<_> = read(&self.backends).keys().cloned().collect();
        schemas.sort();
        schemas
    }

    pub fn clear(&self) {
        write(&self.backends).clear();
    }
}
