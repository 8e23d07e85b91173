// tests/support/mocks/metadata.rs
use change_audit::domain::audit::EntityTypeId;
use change_audit::domain::schema::{ModelMetadata, TableDeclaration};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Declares every type in `schema` and counts how often it is consulted.
/// Each lookup sleeps briefly to widen race windows.
pub struct CountingMetadata {
    pub schema: String,
    pub calls: AtomicUsize,
}

impl CountingMetadata {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelMetadata for CountingMetadata {
    fn table_for(&self, entity_type: &EntityTypeId) -> Option<TableDeclaration> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        Some(TableDeclaration::new(
            Some(self.schema.clone()),
            Some(format!("{}s", entity_type.as_str())),
        ))
    }
}
