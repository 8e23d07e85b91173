// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        capture::{AuditInterceptor, CaptureSettings, DiffEngine},
        ports::{actor::ActorContext, time::Clock},
        queries::audit::AuditQueryService,
    },
    domain::{
        audit::{Auditable, AuditStore, EntityTypeId, IgnoreConfiguration},
        errors::DomainResult,
        schema::{AuditTableRegistry, ModelMetadata, SchemaInfo, SchemaRegistry},
    },
};

/// Everything a host wires once at startup: the registries, the commit
/// interceptor and the history query facade, sharing one set of state.
pub struct AuditServices {
    pub schemas: Arc<SchemaRegistry>,
    pub audit_tables: Arc<AuditTableRegistry>,
    pub ignore: Arc<IgnoreConfiguration>,
    pub interceptor: Arc<AuditInterceptor>,
    pub queries: Arc<AuditQueryService>,
}

impl AuditServices {
    /// `audit_tables` must be the registry the store resolves tables with.
    pub fn new(
        metadata: Arc<dyn ModelMetadata>,
        audit_tables: Arc<AuditTableRegistry>,
        store: Arc<dyn AuditStore>,
        actor: Arc<dyn ActorContext>,
        clock: Arc<dyn Clock>,
        settings: CaptureSettings,
    ) -> Self {
        let schemas = Arc::new(SchemaRegistry::new(metadata));
        let ignore = Arc::new(IgnoreConfiguration::new());

        let engine = Arc::new(DiffEngine::new(
            Arc::clone(&schemas),
            Arc::clone(&audit_tables),
            Arc::clone(&ignore),
            actor,
            clock,
        ));

        let interceptor = Arc::new(AuditInterceptor::new(
            engine,
            Arc::clone(&store),
            Arc::clone(&audit_tables),
            settings,
        ));

        let queries = Arc::new(AuditQueryService::new(
            Arc::clone(&schemas),
            Arc::clone(&audit_tables),
            store,
        ));

        Self {
            schemas,
            audit_tables,
            ignore,
            interceptor,
            queries,
        }
    }

    /// Declares `entity_type` as auditable: resolves its schema info and
    /// registers `<Table>_Audit` for it. Idempotent.
    pub fn register_entity(&self, entity_type: &EntityTypeId) -> DomainResult<Arc<SchemaInfo>> {
        let info = self.schemas.resolve(entity_type)?;
        self.audit_tables.register_schema_info(entity_type, &info);
        Ok(info)
    }

    pub fn register<T: Auditable>(&self) -> DomainResult<Arc<SchemaInfo>> {
        self.register_entity(&EntityTypeId::of::<T>())
    }

    /// Startup hook for ignore rules; errors surface at configuration time.
    pub fn register_ignore_rules<F>(&self, configure: F) -> DomainResult<()>
    where
        F: FnOnce(&IgnoreConfiguration) -> DomainResult<()>,
    {
        configure(&self.ignore)
    }

    pub fn interceptor(&self) -> Arc<AuditInterceptor> {
        Arc::clone(&self.interceptor)
    }

    pub fn queries(&self) -> Arc<AuditQueryService> {
        Arc::clone(&self.queries)
    }

    /// Drops every cached mapping and rule.
    pub fn reset(&self) {
        self.schemas.clear();
        self.audit_tables.clear();
        self.ignore.clear();
    }
}
