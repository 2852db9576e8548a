// # Snapshot Source Trait
//
// Defines the interface for fetching the current reset snapshot from the
// external content API.
//
// ## Implementations
//
// - HTTP content API: `resetcast-source-http` crate
// - Test doubles: scripted sources in the contract tests

use crate::error::Result;
use crate::model::ResetSnapshot;
use async_trait::async_trait;

/// Trait for snapshot source implementations
///
/// # Contract
///
/// Implementations are **single-shot**: one fetch per invocation, no retry
/// logic, no backoff, no caching. The scheduler owns the retry policy; a
/// transient failure must surface as an `Err` so the engine can retry it
/// according to its configured budget.
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current snapshot from the content API
    ///
    /// # Returns
    ///
    /// - `Ok(ResetSnapshot)`: The decoded payload (fields may still be absent;
    ///   data-quality validation is the orchestrator's job)
    /// - `Err(Error)`: Transient fetch failure, eligible for retry
    async fn fetch(&self) -> Result<ResetSnapshot>;

    /// Name of the source, for logging
    fn source_name(&self) -> &'static str {
        "snapshot-source"
    }
}
