// src/infrastructure/actor.rs
use crate::application::ports::actor::{ActorContext, ActorUnavailable};
use crate::domain::audit::ActorIdentity;
use std::future::Future;

tokio::task_local! {
    static CURRENT_ACTOR: ActorIdentity;
}

/// Actor bound to the current tokio task with [`ScopedActorContext::scope`].
///
/// Code running outside any scope sees no actor and is stamped as `system`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopedActorContext;

impl ScopedActorContext {
    pub async fn scope<F>(actor: ActorIdentity, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_ACTOR.scope(actor, fut).await
    }

    pub fn sync_scope<R>(actor: ActorIdentity, f: impl FnOnce() -> R) -> R {
        CURRENT_ACTOR.sync_scope(actor, f)
    }
}

impl ActorContext for ScopedActorContext {
    fn current_actor(&self) -> Result<Option<ActorIdentity>, ActorUnavailable> {
        Ok(CURRENT_ACTOR.try_with(ActorIdentity::clone).ok())
    }
}

/// Same actor for every capture, e.g. a batch job's service account.
#[derive(Debug, Clone)]
pub struct StaticActorContext(ActorIdentity);

impl StaticActorContext {
    pub fn new(actor: ActorIdentity) -> Self {
        Self(actor)
    }
}

impl ActorContext for StaticActorContext {
    fn current_actor(&self) -> Result<Option<ActorIdentity>, ActorUnavailable> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoActorContext;

impl ActorContext for NoActorContext {
    fn current_actor(&self) -> Result<Option<ActorIdentity>, ActorUnavailable> {
        Ok(None)
    }
}
