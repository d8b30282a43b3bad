//! Logging setup and the audit-trail collaborator.

mod audit;
mod logging;

pub use audit::{CsvAuditLog, NullAuditLog};
pub use logging::setup_logging;
