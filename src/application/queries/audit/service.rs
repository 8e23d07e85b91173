use std::sync::Arc;

use crate::domain::{
    audit::AuditStore,
    schema::{AuditTableRegistry, SchemaRegistry},
};

/// Read side of the audit trail. Holds no state besides its collaborators.
pub struct AuditQueryService {
    pub(super) schemas: Arc<SchemaRegistry>,
    pub(super) audit_tables: Arc<AuditTableRegistry>,
    pub(super) store: Arc<dyn AuditStore>,
}

impl AuditQueryService {
    /// `audit_tables` must be the registry the store resolves tables with.
    pub fn new(
        schemas: Arc<SchemaRegistry>,
        audit_tables: Arc<AuditTableRegistry>,
        store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            schemas,
            audit_tables,
            store,
        }
    }
}
