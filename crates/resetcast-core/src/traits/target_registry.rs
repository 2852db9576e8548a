// # Target Registry Trait
//
// Defines the interface to the external registration store that owns the
// lifecycle of broadcast destinations.
//
// ## Contract
//
// The registry is a read-only, eventually-consistent input: the engine
// re-reads it every broadcast cycle and never caches targets across ticks.
// Registration and deregistration belong to the command layer, not to this
// engine.

use crate::error::Result;
use crate::model::BroadcastTarget;
use async_trait::async_trait;

/// Trait for target registry implementations
#[async_trait]
pub trait TargetRegistry: Send + Sync {
    /// Load all targets registered for the given announcement kind
    ///
    /// # Parameters
    ///
    /// - `kind`: Category key identifying which announcements a destination
    ///   subscribed to (e.g. `"DEEP_DESERT"`)
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<BroadcastTarget>)`: All registered destinations, any order
    /// - `Err(Error)`: Storage failure, eligible for tick retry
    async fn load_targets(&self, kind: &str) -> Result<Vec<BroadcastTarget>>;
}
