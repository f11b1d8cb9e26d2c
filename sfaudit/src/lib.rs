// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    AuditRequest, AuditRun, format_catalog, infer_domain, init_config, parse_formats,
    run_audit_request,
};
