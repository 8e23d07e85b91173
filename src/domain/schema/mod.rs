pub mod audit_tables;
pub mod backends;
pub mod info;
pub mod registry;

pub use audit_tables::{AuditTableMapping, AuditTableRegistry};
pub use backends::BackendRegistry;
pub use info::{
    AUDIT_TABLE_SUFFIX, DEFAULT_SCHEMA, ModelMetadata, SchemaInfo, TableDeclaration,
    audit_table_name, qualify,
};
pub use registry::SchemaRegistry;
