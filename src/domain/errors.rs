// src/domain/errors.rs
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The host model declares no schema/table for this entity type.
    #[error("entity type '{0}' is not configured in the model")]
    UnconfiguredEntity(String),
    #[error("invalid ignore expression: {0}")]
    InvalidIgnoreExpression(String),
    #[error("storage unavailable for schema '{schema}': {message}")]
    StorageUnavailable { schema: String, message: String },
    #[error("no audit table mapped for '{0}'")]
    UnresolvableAuditTable(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn storage_unavailable(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            schema: schema.into(),
            message: message.into(),
        }
    }
}
