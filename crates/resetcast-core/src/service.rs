//! Polling broadcast service orchestration
//!
//! Composes the snapshot source, change detector, message renderer, target
//! registry, fan-out broadcaster, and watermark store into one tick:
//!
//! ```text
//! fetch ──► validate ──► detect ──► render ──► load targets ──► fan-out ──► persist
//!              │            │
//!              ▼            ▼
//!          no-op tick   no-op tick
//! ```
//!
//! Error discipline per tick:
//! - Fetch and registry failures propagate to the scheduler for retry
//! - An incomplete snapshot (no reset marker, no locations) is a data-quality
//!   condition: logged, not retried, nothing announced
//! - The watermark is persisted only after a broadcast attempt; a persistence
//!   failure is logged as a duplicate-announcement risk, never fatal

use crate::broadcast::ShardFanoutBroadcaster;
use crate::config::{AnnouncementConfig, ServiceConfig};
use crate::detect;
use crate::error::Result;
use crate::message;
use crate::model::Watermark;
use crate::scheduler::TickHandler;
use crate::traits::{SnapshotSource, TargetRegistry, WatermarkStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// One polling broadcast service instance, e.g. the weekly rotation announcer
///
/// Holds the in-memory mirror of the persisted watermark. The scheduler's
/// no-overlap invariant means the mirror is read once at tick start and
/// written once at tick end by the single active tick.
pub struct PollingBroadcastService {
    config: ServiceConfig,
    announce: AnnouncementConfig,
    source: Arc<dyn SnapshotSource>,
    registry: Arc<dyn TargetRegistry>,
    store: Arc<dyn WatermarkStore>,
    broadcaster: ShardFanoutBroadcaster,
    last_watermark: RwLock<Option<Watermark>>,
}

impl PollingBroadcastService {
    pub fn new(
        config: ServiceConfig,
        announce: AnnouncementConfig,
        source: Arc<dyn SnapshotSource>,
        registry: Arc<dyn TargetRegistry>,
        store: Arc<dyn WatermarkStore>,
        broadcaster: ShardFanoutBroadcaster,
    ) -> Result<Self> {
        config.validate()?;
        announce.validate()?;

        Ok(Self {
            config,
            announce,
            source,
            registry,
            store,
            broadcaster,
            last_watermark: RwLock::new(None),
        })
    }

    /// The watermark of the last announced reset, if any
    pub async fn last_watermark(&self) -> Option<Watermark> {
        *self.last_watermark.read().await
    }

    /// Administrative override of the watermark
    ///
    /// `Some` persists the given value; `None` clears the cache entry. Used
    /// for operational recovery and tests.
    pub async fn set_last_watermark(&self, watermark: Option<Watermark>) -> Result<()> {
        *self.last_watermark.write().await = watermark;
        match watermark {
            Some(watermark) => {
                self.store.save(&self.announce.cache_key, watermark).await?;
                debug!(service = %self.config.name, %watermark, "watermark overridden");
            }
            None => {
                self.store.clear(&self.announce.cache_key).await?;
                debug!(service = %self.config.name, "watermark cleared via override");
            }
        }
        Ok(())
    }

    /// Administrative reset: forces a cold start on the next tick
    pub async fn clear_cache(&self) -> Result<()> {
        self.store.clear(&self.announce.cache_key).await?;
        *self.last_watermark.write().await = None;
        debug!(service = %self.config.name, "watermark cache cleared");
        Ok(())
    }
}

#[async_trait]
impl TickHandler for PollingBroadcastService {
    async fn on_start(&self) {
        // A load failure is a cold start, not a fatal condition
        let loaded = match self.store.load(&self.announce.cache_key).await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(service = %self.config.name, "failed to load watermark: {e}");
                None
            }
        };
        debug!(service = %self.config.name, watermark = ?loaded, "loaded watermark from cache");
        *self.last_watermark.write().await = loaded;
        info!(service = %self.config.name, "service starting");
    }

    async fn tick(&self) -> Result<()> {
        // Fetch failures propagate: the scheduler owns the retry budget
        let snapshot = self.source.fetch().await?;

        let Some(candidate) = snapshot.next_reset else {
            warn!(service = %self.config.name, "snapshot has no next-reset marker, skipping");
            return Ok(());
        };
        if snapshot.locations.is_empty() {
            warn!(service = %self.config.name, "snapshot has no locations, skipping");
            return Ok(());
        }

        let cached = *self.last_watermark.read().await;
        if !detect::has_changed(candidate, cached) {
            debug!(service = %self.config.name, "no new reset detected");
            return Ok(());
        }

        info!(service = %self.config.name, reset = %candidate, "new reset detected");

        let items = detect::extract_announcement_items(&snapshot, self.announce.tier);
        if items.is_empty() {
            info!(service = %self.config.name, "no eligible items this rotation, nothing to announce");
            return Ok(());
        }

        let body = message::render(&self.announce.style, candidate, &items);

        let targets = self.registry.load_targets(&self.announce.target_kind).await?;
        info!(
            service = %self.config.name,
            targets = targets.len(),
            items = items.len(),
            "broadcasting announcement"
        );

        let outcomes = self.broadcaster.broadcast(&targets, &body).await;
        debug!(service = %self.config.name, ?outcomes, "per-target outcomes");

        // The broadcast attempt happened; advance the watermark regardless of
        // individual per-target outcomes
        *self.last_watermark.write().await = Some(candidate);
        if let Err(e) = self.store.save(&self.announce.cache_key, candidate).await {
            // The announcement may repeat after a restart; an operator can
            // fix up with set_last_watermark
            error!(
                service = %self.config.name,
                watermark = %candidate,
                "failed to persist watermark after broadcast: {e}"
            );
        }

        Ok(())
    }

    async fn on_stop(&self) {
        info!(service = %self.config.name, "service stopping");
    }
}
