// src/application/ports/actor.rs
use crate::domain::audit::ActorIdentity;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("actor context unavailable: {0}")]
pub struct ActorUnavailable(pub String);

/// Supplies the identity behind the current logical operation.
///
/// `Ok(None)` means "no actor" (background work); callers substitute the
/// `system` sentinel for both that case and for errors.
pub trait ActorContext: Send + Sync {
    fn current_actor(&self) -> Result<Option<ActorIdentity>, ActorUnavailable>;
}
