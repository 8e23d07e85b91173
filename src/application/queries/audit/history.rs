use super::AuditQueryService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::audit::{AuditRecord, Auditable, EntityTypeId, format_entity_id},
};
use tracing::instrument;

impl AuditQueryService {
    /// History of one entity, newest first.
    #[instrument(skip(self, entity_type), fields(entity_type = %entity_type))]
    pub async fn history_for(
        &self,
        entity_type: &EntityTypeId,
        entity_id: &str,
    ) -> ApplicationResult<Vec<AuditRecord>> {
        if entity_id.trim().is_empty() {
            return Err(ApplicationError::validation("entity id cannot be empty"));
        }

        let info = self.schemas.resolve(entity_type)?;
        // a fresh process may query before anything was captured
        self.audit_tables.register_schema_info(entity_type, &info);
        let records = self
            .store
            .history(&info.qualified_name(), entity_id, &info.schema)
            .await?;
        Ok(records)
    }

    /// History of a typed entity, keyed by its primary-key values.
    pub async fn history_of<T: Auditable>(&self, entity: &T) -> ApplicationResult<Vec<AuditRecord>> {
        let key = entity.key_values();
        self.history_for(&EntityTypeId::of::<T>(), &format_entity_id(&key))
            .await
    }
}
