// src/infrastructure/mod.rs
pub mod actor;
pub mod database;
pub mod model;
pub mod stores;
pub mod time;
