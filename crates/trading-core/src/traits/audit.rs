//! Audit sink trait definition.

use crate::error::AuditError;
use crate::types::ExecutionRecord;
use async_trait::async_trait;

/// Trait for append-only audit trails.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record.
    async fn record(&self, record: &ExecutionRecord) -> Result<(), AuditError>;
}
