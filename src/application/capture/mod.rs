mod diff;
mod interceptor;

pub use diff::{DiffEngine, compute_changes};
pub use interceptor::{
    AuditInterceptor, CaptureReport, CaptureSettings, DEFAULT_SAVE_TIMEOUT, PartitionResult,
};
