//! Test doubles and common utilities for the contract tests
//!
//! Minimal doubles that count calls and record deliveries so tests can verify
//! the engine's orchestration contracts without any real I/O.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use resetcast_core::error::{Error, Result};
use resetcast_core::model::{
    BroadcastTarget, ChannelInfo, Entity, Location, LootEntry, MessageInfo, ResetSnapshot,
    Watermark, WebhookInfo,
};
use resetcast_core::scheduler::TickHandler;
use resetcast_core::traits::{ShardGateway, SnapshotSource, TargetRegistry, WatermarkStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A snapshot source with a scripted failure budget
///
/// Fails the first `failures` fetches, then returns the configured snapshot
/// (or keeps failing when no snapshot was configured).
pub struct ScriptedSnapshotSource {
    snapshot: Option<ResetSnapshot>,
    failures_remaining: AtomicUsize,
    fetch_count: Arc<AtomicUsize>,
}

impl ScriptedSnapshotSource {
    /// Always returns the given snapshot
    pub fn always(snapshot: ResetSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            failures_remaining: AtomicUsize::new(0),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fails
    pub fn failing() -> Self {
        Self {
            snapshot: None,
            failures_remaining: AtomicUsize::new(usize::MAX),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fails `failures` times, then returns the snapshot
    pub fn fail_then(failures: usize, snapshot: ResetSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            failures_remaining: AtomicUsize::new(failures),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the fetch counter
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetch_count)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSnapshotSource {
    async fn fetch(&self) -> Result<ResetSnapshot> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.failures_remaining.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(Error::source("scripted fetch failure"));
        }

        self.snapshot
            .clone()
            .ok_or_else(|| Error::source("no snapshot scripted"))
    }
}

/// A target registry serving a fixed list, counting loads
pub struct FixedTargetRegistry {
    targets: Vec<BroadcastTarget>,
    load_count: Arc<AtomicUsize>,
}

impl FixedTargetRegistry {
    pub fn new(targets: Vec<BroadcastTarget>) -> Self {
        Self {
            targets,
            load_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.load_count)
    }
}

#[async_trait]
impl TargetRegistry for FixedTargetRegistry {
    async fn load_targets(&self, _kind: &str) -> Result<Vec<BroadcastTarget>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.targets.clone())
    }
}

/// A watermark store with shared counters and a switchable save failure
#[derive(Clone, Default)]
pub struct CountingWatermarkStore {
    state: Arc<Mutex<HashMap<String, Watermark>>>,
    save_count: Arc<AtomicUsize>,
    clear_count: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl CountingWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted watermark before the service starts
    pub fn preset(self, key: &str, watermark: Watermark) -> Self {
        self.state
            .lock()
            .unwrap()
            .insert(key.to_string(), watermark);
        self
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &str) -> Option<Watermark> {
        self.state.lock().unwrap().get(key).copied()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WatermarkStore for CountingWatermarkStore {
    async fn load(&self, key: &str) -> Result<Option<Watermark>> {
        Ok(self.state.lock().unwrap().get(key).copied())
    }

    async fn save(&self, key: &str, watermark: Watermark) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::state_store("scripted save failure"));
        }
        self.save_count.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .insert(key.to_string(), watermark);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A scripted shard gateway recording deliveries and deletions
pub struct MockShardGateway {
    shard_id: u32,
    total_shards: u32,
    channels: HashMap<String, ChannelInfo>,
    webhooks: HashMap<String, Vec<WebhookInfo>>,
    history: HashMap<String, Vec<MessageInfo>>,
    fail_cleanup: bool,
    failing_webhooks: HashSet<String>,
    /// (webhook_id, content) pairs, in send order
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    /// Message ids removed via single delete
    pub deleted: Arc<Mutex<Vec<String>>>,
    /// Batches removed via bulk delete
    pub bulk_deleted: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockShardGateway {
    pub fn new(shard_id: u32, total_shards: u32) -> Self {
        Self {
            shard_id,
            total_shards,
            channels: HashMap::new(),
            webhooks: HashMap::new(),
            history: HashMap::new(),
            fail_cleanup: false,
            failing_webhooks: HashSet::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            bulk_deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_channel(mut self, channel_id: &str) -> Self {
        self.channels.insert(
            channel_id.to_string(),
            ChannelInfo {
                id: channel_id.to_string(),
                is_text: true,
                is_thread: false,
            },
        );
        self
    }

    pub fn with_thread_channel(mut self, channel_id: &str) -> Self {
        self.channels.insert(
            channel_id.to_string(),
            ChannelInfo {
                id: channel_id.to_string(),
                is_text: true,
                is_thread: true,
            },
        );
        self
    }

    pub fn with_webhook(mut self, channel_id: &str, webhook_id: &str, token: &str) -> Self {
        self.webhooks
            .entry(channel_id.to_string())
            .or_default()
            .push(WebhookInfo {
                id: webhook_id.to_string(),
                token: Some(token.to_string()),
            });
        self
    }

    pub fn with_history(mut self, channel_id: &str, messages: Vec<MessageInfo>) -> Self {
        self.history.insert(channel_id.to_string(), messages);
        self
    }

    pub fn with_failing_cleanup(mut self) -> Self {
        self.fail_cleanup = true;
        self
    }

    pub fn with_failing_send(mut self, webhook_id: &str) -> Self {
        self.failing_webhooks.insert(webhook_id.to_string());
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ShardGateway for MockShardGateway {
    fn shard_id(&self) -> u32 {
        self.shard_id
    }

    fn total_shards(&self) -> u32 {
        self.total_shards
    }

    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        Ok(self.channels.get(channel_id).cloned())
    }

    async fn list_webhooks(&self, channel_id: &str) -> Result<Vec<WebhookInfo>> {
        Ok(self.webhooks.get(channel_id).cloned().unwrap_or_default())
    }

    async fn recent_messages(&self, channel_id: &str, limit: u8) -> Result<Vec<MessageInfo>> {
        let mut messages = self.history.get(channel_id).cloned().unwrap_or_default();
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn delete_message(&self, _channel_id: &str, message_id: &str) -> Result<()> {
        if self.fail_cleanup {
            return Err(Error::gateway("scripted delete failure"));
        }
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }

    async fn bulk_delete(&self, _channel_id: &str, message_ids: &[String]) -> Result<()> {
        if self.fail_cleanup {
            return Err(Error::gateway("scripted bulk delete failure"));
        }
        self.bulk_deleted.lock().unwrap().push(message_ids.to_vec());
        Ok(())
    }

    async fn send_webhook_message(
        &self,
        webhook_id: &str,
        _webhook_token: &str,
        content: &str,
    ) -> Result<()> {
        if self.failing_webhooks.contains(webhook_id) {
            return Err(Error::gateway("scripted send failure"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((webhook_id.to_string(), content.to_string()));
        Ok(())
    }
}

/// A tick handler that counts invocations and fails on demand
pub struct CountingTickHandler {
    succeed: bool,
    pub tick_count: Arc<AtomicUsize>,
    pub start_count: Arc<AtomicUsize>,
    pub stop_count: Arc<AtomicUsize>,
}

impl CountingTickHandler {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            tick_count: Arc::new(AtomicUsize::new(0)),
            start_count: Arc::new(AtomicUsize::new(0)),
            stop_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::succeeding()
        }
    }

    pub fn ticks(&self) -> usize {
        self.tick_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TickHandler for CountingTickHandler {
    async fn on_start(&self) {
        self.start_count.fetch_add(1, Ordering::SeqCst);
    }

    async fn tick(&self) -> Result<()> {
        self.tick_count.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(Error::Other("scripted tick failure".to_string()))
        }
    }

    async fn on_stop(&self) {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A tick handler whose tick takes a fixed amount of (virtual) time
///
/// Tracks how many ticks ran concurrently so tests can assert the scheduler's
/// no-overlap invariant, and how many ticks ran to completion so tests can
/// assert shutdown waits for in-flight work.
pub struct SlowTickHandler {
    tick_duration: Duration,
    active: AtomicUsize,
    pub started: Arc<AtomicUsize>,
    pub completed: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

impl SlowTickHandler {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration,
            active: AtomicUsize::new(0),
            started: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TickHandler for SlowTickHandler {
    async fn tick(&self) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        tokio::time::sleep(self.tick_duration).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A guild id owned by the given shard under the platform partition function
pub fn guild_for_shard(shard_id: u32, _total_shards: u32) -> u64 {
    u64::from(shard_id) << 22
}

/// A registered target
pub fn target(guild_id: u64, channel_id: &str, webhook_id: &str, token: &str) -> BroadcastTarget {
    BroadcastTarget {
        guild_id,
        channel_id: channel_id.to_string(),
        webhook_id: webhook_id.to_string(),
        webhook_token: token.to_string(),
    }
}

/// A snapshot with one location holding the given tier entities
pub fn snapshot_with_entities(next_reset: i64, entities: &[(&str, &str, u8)]) -> ResetSnapshot {
    ResetSnapshot {
        next_reset: Some(Watermark::from_secs(next_reset)),
        locations: vec![Location {
            loot: entities
                .iter()
                .map(|(id, name, tier)| LootEntry {
                    entity: Some(Entity {
                        id: Some(id.to_string()),
                        name: Some(name.to_string()),
                        tier: Some(*tier),
                        main_category_id: None,
                        schematic_output_item: None,
                    }),
                })
                .collect(),
        }],
    }
}

/// A webhook message created one hour ago (inside the retention horizon)
pub fn recent_webhook_message(id: &str, webhook_id: &str) -> MessageInfo {
    MessageInfo {
        id: id.to_string(),
        webhook_id: Some(webhook_id.to_string()),
        created_at: Utc::now() - ChronoDuration::hours(1),
    }
}

/// A webhook message created 30 days ago (outside the retention horizon)
pub fn old_webhook_message(id: &str, webhook_id: &str) -> MessageInfo {
    MessageInfo {
        id: id.to_string(),
        webhook_id: Some(webhook_id.to_string()),
        created_at: Utc::now() - ChronoDuration::days(30),
    }
}
