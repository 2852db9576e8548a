// # resetcast-core
//
// Core library for the resetcast broadcast engine.
//
// ## Architecture Overview
//
// This library provides everything needed to run a periodic reset-announcement
// broadcast:
// - **SnapshotSource**: Trait for fetching the current reset snapshot
// - **TargetRegistry**: Trait for loading the registered broadcast destinations
// - **ShardGateway**: Trait for per-shard channel/webhook operations
// - **WatermarkStore**: Trait for persistent watermark state (idempotency)
// - **RetryingScheduler**: Lifecycle + interval + retry wrapper around a tick
// - **ShardFanoutBroadcaster**: Shard-partitioned message delivery with cleanup
// - **PollingBroadcastService**: Orchestrates fetch → detect → render → fan-out
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Free DI**: Collaborators are constructed once and injected
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: The persisted watermark ensures a reset is announced once

pub mod broadcast;
pub mod config;
pub mod detect;
pub mod error;
pub mod message;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use broadcast::{ShardFanoutBroadcaster, shard_for_guild};
pub use config::{AnnouncementConfig, ServiceConfig};
pub use error::{Error, Result};
pub use message::MessageStyle;
pub use model::{AnnouncementItem, BroadcastTarget, DeliveryOutcome, ResetSnapshot, Watermark};
pub use scheduler::{RetryingScheduler, TickHandler};
pub use service::PollingBroadcastService;
pub use state::{FileTargetRegistry, FileWatermarkStore, MemoryWatermarkStore};
pub use traits::{ShardGateway, SnapshotSource, TargetRegistry, WatermarkStore};
