// src/application/ports/mod.rs
pub mod actor;
pub mod time;
