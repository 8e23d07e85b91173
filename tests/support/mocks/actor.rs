// tests/support/mocks/actor.rs
use change_audit::application::ports::actor::{ActorContext, ActorUnavailable};
use change_audit::domain::audit::ActorIdentity;

/// Actor provider whose backing session store is down.
pub struct FailingActorContext;

impl ActorContext for FailingActorContext {
    fn current_actor(&self) -> Result<Option<ActorIdentity>, ActorUnavailable> {
        Err(ActorUnavailable("session store unreachable".into()))
    }
}
