// # Watermark Store Trait
//
// Defines the interface for persistent watermark state.
//
// ## Purpose
//
// The watermark store ensures idempotency by remembering, per cache key, the
// last reset timestamp that was already announced. This prevents duplicate
// announcements and provides crash recovery.
//
// ## Implementations
//
// - In-memory: [`crate::state::MemoryWatermarkStore`] (tests, ephemeral runs)
// - File-based: [`crate::state::FileWatermarkStore`] (JSON with atomic writes)
//
// ## Contract
//
// Given the engine's no-overlap tick invariant, the watermark is read once at
// tick start and written once at tick end by the single active tick, so
// implementations need thread safety but no cross-tick coordination.

use crate::error::Result;
use crate::model::Watermark;
use async_trait::async_trait;

/// Trait for watermark store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Load the watermark stored under `key`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Watermark))`: A previously persisted watermark
    /// - `Ok(None)`: Cold start; nothing was announced yet
    /// - `Err(Error)`: Storage failure (callers treat this as a cold start)
    async fn load(&self, key: &str) -> Result<Option<Watermark>>;

    /// Persist `watermark` under `key`, replacing any previous value
    ///
    /// A failure here is surfaced to the caller: the broadcast already
    /// happened, so the caller must log the inconsistency risk.
    async fn save(&self, key: &str, watermark: Watermark) -> Result<()>;

    /// Remove the watermark stored under `key`, forcing a cold start
    async fn clear(&self, key: &str) -> Result<()>;
}
