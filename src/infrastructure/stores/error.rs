// src/infrastructure/stores/error.rs
use crate::domain::errors::DomainError;

/// SQLSTATE class 08: connection exception.
const CONNECTION_EXCEPTION_CLASS: &str = "08";
const ADMIN_SHUTDOWN: &str = "57P01";
const CANNOT_CONNECT_NOW: &str = "57P03";

/// Maps a sqlx error raised while talking to `schema`'s backend.
/// Anything that means "the database could not be reached" becomes
/// `StorageUnavailable`; the rest is a persistence failure.
pub fn map_sqlx(schema: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DomainError::storage_unavailable(schema, err.to_string()),
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code = code.as_ref();
                if code.starts_with(CONNECTION_EXCEPTION_CLASS)
                    || code == ADMIN_SHUTDOWN
                    || code == CANNOT_CONNECT_NOW
                {
                    return DomainError::storage_unavailable(schema, db_err.message());
                }
            }
            DomainError::Persistence(db_err.message().to_string())
        }
        _ => DomainError::Persistence(err.to_string()),
    }
}
