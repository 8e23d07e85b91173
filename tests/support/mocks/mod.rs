// tests/support/mocks/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod actor;
pub mod metadata;
pub mod store;
pub mod time;

pub use actor::FailingActorContext;
pub use metadata::CountingMetadata;
pub use store::{FailingStore, SlowStore};
pub use time::{SteppingClock, fixed_now};
