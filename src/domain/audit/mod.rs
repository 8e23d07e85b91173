pub mod entity;
pub mod entity_type;
pub mod ignore;
pub mod mutation;
pub mod repository;

pub use entity::{ActorIdentity, AuditRecord, ChangeSet, FieldChange, Operation, SYSTEM_ACTOR};
pub use entity_type::{Auditable, EntityTypeId};
pub use ignore::{EntityPredicate, IgnoreConfiguration};
pub use mutation::{EntitySnapshot, FieldState, KEY_DELIMITER, TrackedMutation, format_entity_id};
pub use repository::{AuditStore, SaveOutcome};
