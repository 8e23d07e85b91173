// src/infrastructure/stores/identifiers.rs
use crate::domain::errors::{DomainError, DomainResult};

/// PostgreSQL truncates identifiers beyond this many bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Double-quotes a schema or table name after checking it is a plain
/// `[A-Za-z0-9_]` identifier, so it can be spliced into DDL and queries.
pub fn quote_ident(name: &str) -> DomainResult<String> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN {
        return Err(DomainError::Validation(format!(
            "identifier '{name}' must be 1..={MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::Validation(format!(
            "identifier '{name}' may only contain letters, digits and '_'"
        )));
    }
    Ok(format!("\"{name}\""))
}

/// `"schema"."table"`.
pub fn qualified_table(schema: &str, table: &str) -> DomainResult<String> {
    Ok(format!("{}.{}", quote_ident(schema)?, quote_ident(table)?))
}

/// Name of the history lookup index, cut to the identifier limit.
pub fn history_index_name(audit_table: &str) -> String {
    let mut name = format!("IX_{audit_table}_EntityId_CreatedAt");
    name.truncate(MAX_IDENTIFIER_LEN);
    name
}
