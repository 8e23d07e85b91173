// tests/support/helpers.rs
use super::entities::{Invoice, OrderLine};
use super::mocks::fixed_now;
use change_audit::application::capture::CaptureSettings;
use change_audit::application::ports::{actor::ActorContext, time::Clock};
use change_audit::application::services::AuditServices;
use change_audit::domain::audit::AuditStore;
use change_audit::domain::schema::AuditTableRegistry;
use change_audit::infrastructure::{
    actor::NoActorContext, model::StaticModelMetadata, stores::InMemoryAuditStore,
    time::FixedClock,
};
use std::sync::Arc;
use std::time::Duration;

/// Services over the in-memory store with `Invoice` in `dbo` and
/// `OrderLine` in `Sales.OrderLines`; both schemas have a backend.
pub struct Harness {
    pub services: Arc<AuditServices>,
    pub store: Arc<InMemoryAuditStore>,
}

pub struct HarnessBuilder {
    actor: Arc<dyn ActorContext>,
    clock: Arc<dyn Clock>,
    settings: CaptureSettings,
    store: Option<Arc<dyn AuditStore>>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            actor: Arc::new(NoActorContext),
            clock: Arc::new(FixedClock(fixed_now())),
            settings: CaptureSettings::default(),
            store: None,
        }
    }
}

impl HarnessBuilder {
    pub fn actor(mut self, actor: impl ActorContext + 'static) -> Self {
        self.actor = Arc::new(actor);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn save_timeout(mut self, timeout: Duration) -> Self {
        self.settings.save_timeout = timeout;
        self
    }

    /// Replaces the in-memory store seen by the services.
    pub fn store(mut self, store: impl AuditStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn build(self) -> Harness {
        let metadata = StaticModelMetadata::new();
        metadata
            .declare_entity::<Invoice>(None, None)
            .declare_entity::<OrderLine>(Some("Sales"), Some("OrderLines"));

        let audit_tables = Arc::new(AuditTableRegistry::new());
        let store = Arc::new(InMemoryAuditStore::new(Arc::clone(&audit_tables)));
        store.add_schema("dbo");
        store.add_schema("sales");

        let seen_store = self
            .store
            .unwrap_or_else(|| Arc::clone(&store) as Arc<dyn AuditStore>);

        let services = Arc::new(AuditServices::new(
            Arc::new(metadata),
            audit_tables,
            seen_store,
            self.actor,
            self.clock,
            self.settings,
        ));

        Harness { services, store }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::default().build()
}
