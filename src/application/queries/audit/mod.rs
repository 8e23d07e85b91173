mod history;
mod service;

pub use service::AuditQueryService;
