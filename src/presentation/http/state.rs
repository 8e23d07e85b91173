// src/presentation/http/state.rs
use crate::application::services::AuditServices;
use std::sync::Arc;

#[derive(Clone)]
pub struct HttpState {
    pub services: Arc<AuditServices>,
}

impl HttpState {
    pub fn new(services: Arc<AuditServices>) -> Self {
        Self { services }
    }
}
