//! Collaborator traits
//!
//! Every external system the engine talks to is reached through one of these
//! seams. Implementations live in sibling crates (HTTP source, Discord
//! gateway) or in [`crate::state`]; the engine itself only ever holds trait
//! objects.

pub mod gateway;
pub mod snapshot_source;
pub mod target_registry;
pub mod watermark_store;

pub use gateway::ShardGateway;
pub use snapshot_source::SnapshotSource;
pub use target_registry::TargetRegistry;
pub use watermark_store::WatermarkStore;
