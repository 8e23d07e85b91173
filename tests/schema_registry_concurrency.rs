// tests/schema_registry_concurrency.rs
use change_audit::domain::audit::EntityTypeId;
use change_audit::domain::errors::DomainError;
use change_audit::domain::schema::SchemaRegistry;
use change_audit::infrastructure::model::StaticModelMetadata;
use std::sync::{Arc, Barrier};
use std::thread;

mod support;
use support::CountingMetadata;

const CALLERS: usize = 16;

/// 初回解決が競合しても導出は一度だけ
#[test]
fn concurrent_first_resolution_derives_once() {
    let metadata = Arc::new(CountingMetadata::new("Sales"));
    let registry = Arc::new(SchemaRegistry::new(metadata.clone()));
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.resolve(&EntityTypeId::new("Order").unwrap()).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(metadata.calls(), 1);
    assert_eq!(registry.len(), 1);
    assert!(results.iter().all(|info| Arc::ptr_eq(info, &results[0])));
    assert_eq!(results[0].qualified_name(), "Sales.Orders");
}

#[test]
fn distinct_types_derive_independently() {
    let metadata = Arc::new(CountingMetadata::new("dbo"));
    let registry = Arc::new(SchemaRegistry::new(metadata.clone()));

    let handles: Vec<_> = ["Order", "Invoice", "Order", "Invoice"]
        .into_iter()
        .map(|name| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.resolve(&EntityTypeId::new(name).unwrap()).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(metadata.calls(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn unconfigured_types_fail_without_poisoning_the_cache() {
    let metadata = StaticModelMetadata::new();
    metadata.declare(&EntityTypeId::new("Invoice").unwrap(), None, None);
    let registry = SchemaRegistry::new(Arc::new(metadata));

    let err = registry
        .resolve(&EntityTypeId::new("Ghost").unwrap())
        .unwrap_err();
    assert!(matches!(err, DomainError::UnconfiguredEntity(_)));
    assert!(registry.is_empty());

    let info = registry.resolve(&EntityTypeId::new("Invoice").unwrap()).unwrap();
    assert_eq!(info.qualified_name(), "dbo.Invoice");
    assert_eq!(info.audit_table_name(), "Invoice_Audit");

    registry.clear();
    assert!(registry.cached(&EntityTypeId::new("Invoice").unwrap()).is_none());
}
