//! Result sink trait.

use async_trait::async_trait;
use bp_error::Result;
use bp_types::RootReport;

/// Trait for delivering audit results.
///
/// The auditor calls [`record`](ResultSink::record) once per root, right after
/// that root finishes, so results survive an interrupted run.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Record the report of a completed root.
    async fn record(&self, report: &RootReport) -> Result<()>;

    /// Flush any buffered output.
    async fn flush(&self) -> Result<()>;
}
