// src/domain/schema/registry.rs
use super::info::{DEFAULT_SCHEMA, ModelMetadata, SchemaInfo};
use crate::domain::audit::EntityTypeId;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::sync::{lock, read, write};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use tracing::debug;

/// Derive-once cache from entity type to [`SchemaInfo`].
///
/// Each type owns a slot that is filled at most once. The map lock is only
/// held to find or create a slot; derivation runs under the slot's own
/// mutex, so a slow type never stalls lookups of other types and racing
/// callers of one type all observe the same `Arc`.
pub struct SchemaRegistry {
    metadata: Arc<dyn ModelMetadata>,
    cache: RwLock<HashMap<EntityTypeId, Arc<Slot>>>,
}

#[derive(Default)]
struct Slot {
    info: OnceLock<Arc<SchemaInfo>>,
    init: Mutex<()>,
}

impl SchemaRegistry {
    pub fn new(metadata: Arc<dyn ModelMetadata>) -> Self {
        Self {
            metadata,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, entity_type: &EntityTypeId) -> DomainResult<Arc<SchemaInfo>> {
        if let Some(info) = self.cached(entity_type) {
            return Ok(info);
        }

        let slot = Arc::clone(write(&self.cache).entry(entity_type.clone()).or_default());
        let _init = lock(&slot.init);
        if let Some(info) = slot.info.get() {
            return Ok(Arc::clone(info));
        }

        // a failed derivation leaves the slot empty; the next call retries
        let info = Arc::new(self.derive(entity_type)?);
        debug!(
            entity_type = %entity_type,
            schema = %info.schema,
            table = %info.table_name,
            "schema info derived"
        );
        Ok(Arc::clone(slot.info.get_or_init(|| info)))
    }

    /// Cached entry, without deriving.
    pub fn cached(&self, entity_type: &EntityTypeId) -> Option<Arc<SchemaInfo>> {
        read(&self.cache)
            .get(entity_type)
            .and_then(|slot| slot.info.get().cloned())
    }

    /// Number of derived entries.
    pub fn len(&self) -> usize {
        read(&self.cache)
            .values()
            .filter(|slot| slot.info.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        write(&self.cache).clear();
    }

    fn derive(&self, entity_type: &EntityTypeId) -> DomainResult<SchemaInfo> {
        let declaration = self
            .metadata
            .table_for(entity_type)
            .ok_or_else(|| DomainError::UnconfiguredEntity(entity_type.to_string()))?;

        let schema = declaration
            .schema
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let table = declaration
            .table
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| entity_type.to_string());

        Ok(SchemaInfo::new(schema, table, entity_type.as_str()))
    }
}
