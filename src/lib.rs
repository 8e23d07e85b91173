// src/lib.rs
//! Schema-aware change auditing: diff tracked entity mutations at commit
//! time, route the resulting records to per-schema audit tables and read
//! entity history back.
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod telemetry;
