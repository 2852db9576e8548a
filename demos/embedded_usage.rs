//! Minimal embedding example for resetcast-core
//!
//! This example demonstrates using resetcast-core as a library in a custom
//! application. All collaborators are custom in-process implementations and
//! the scheduler lifecycle is fully managed by the application.

use async_trait::async_trait;
use resetcast_core::model::{
    BroadcastTarget, ChannelInfo, Entity, Location, LootEntry, MessageInfo, ResetSnapshot,
    Watermark, WebhookInfo,
};
use resetcast_core::traits::{ShardGateway, SnapshotSource, TargetRegistry};
use resetcast_core::{
    AnnouncementConfig, MemoryWatermarkStore, PollingBroadcastService, Result, RetryingScheduler,
    ServiceConfig, ShardFanoutBroadcaster, TickHandler,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Custom snapshot source for embedded usage
///
/// Serves a fixed snapshot; a real embedding would fetch it from wherever the
/// application keeps rotation state.
struct EmbeddedSnapshotSource {
    snapshot: ResetSnapshot,
}

impl EmbeddedSnapshotSource {
    fn new() -> Self {
        let entity = |id: &str, name: &str| Entity {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            tier: Some(6),
            main_category_id: Some("weapons".to_string()),
            schematic_output_item: None,
        };

        Self {
            snapshot: ResetSnapshot {
                next_reset: Some(Watermark::from_secs(1_700_000_000)),
                locations: vec![Location {
                    loot: vec![
                        LootEntry {
                            entity: Some(entity("e1", "Karpov 38")),
                        },
                        LootEntry {
                            entity: Some(entity("e2", "Disruptor Pistol")),
                        },
                    ],
                }],
            },
        }
    }
}

#[async_trait]
impl SnapshotSource for EmbeddedSnapshotSource {
    async fn fetch(&self) -> Result<ResetSnapshot> {
        Ok(self.snapshot.clone())
    }

    fn source_name(&self) -> &'static str {
        "embedded"
    }
}

/// Custom target registry for embedded usage
struct EmbeddedRegistry {
    targets: Vec<BroadcastTarget>,
}

#[async_trait]
impl TargetRegistry for EmbeddedRegistry {
    async fn load_targets(&self, _kind: &str) -> Result<Vec<BroadcastTarget>> {
        Ok(self.targets.clone())
    }
}

/// Custom gateway for embedded usage: prints instead of calling a platform
struct EmbeddedGateway {
    webhook_id: String,
    webhook_token: String,
    send_calls: Arc<AtomicUsize>,
}

impl EmbeddedGateway {
    fn new(webhook_id: &str, webhook_token: &str) -> Self {
        Self {
            webhook_id: webhook_id.to_string(),
            webhook_token: webhook_token.to_string(),
            send_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ShardGateway for EmbeddedGateway {
    fn shard_id(&self) -> u32 {
        0
    }

    fn total_shards(&self) -> u32 {
        1
    }

    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        Ok(Some(ChannelInfo {
            id: channel_id.to_string(),
            is_text: true,
            is_thread: false,
        }))
    }

    async fn list_webhooks(&self, _channel_id: &str) -> Result<Vec<WebhookInfo>> {
        Ok(vec![WebhookInfo {
            id: self.webhook_id.clone(),
            token: Some(self.webhook_token.clone()),
        }])
    }

    async fn recent_messages(&self, _channel_id: &str, _limit: u8) -> Result<Vec<MessageInfo>> {
        Ok(Vec::new())
    }

    async fn delete_message(&self, _channel_id: &str, _message_id: &str) -> Result<()> {
        Ok(())
    }

    async fn bulk_delete(&self, _channel_id: &str, _message_ids: &[String]) -> Result<()> {
        Ok(())
    }

    async fn send_webhook_message(
        &self,
        webhook_id: &str,
        _webhook_token: &str,
        content: &str,
    ) -> Result<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] webhook {} received:\n{}\n", webhook_id, content);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded resetcast-core Example ===\n");

    // Create custom components
    println!("1. Creating components...");
    let source = Arc::new(EmbeddedSnapshotSource::new());
    let registry = Arc::new(EmbeddedRegistry {
        targets: vec![BroadcastTarget {
            guild_id: 42,
            channel_id: "embedded-channel".to_string(),
            webhook_id: "embedded-webhook".to_string(),
            webhook_token: "embedded-token".to_string(),
        }],
    });
    let store = Arc::new(MemoryWatermarkStore::new());
    let gateway = EmbeddedGateway::new("embedded-webhook", "embedded-token");
    let send_calls = Arc::clone(&gateway.send_calls);
    let broadcaster = ShardFanoutBroadcaster::new(vec![Arc::new(gateway)]);

    // Create configuration
    let config = ServiceConfig::new("embedded-demo")
        .with_interval(Duration::from_secs(1))
        .with_retries(0, Duration::from_secs(1));
    let announce = AnnouncementConfig::new("embedded-demo:last", "EMBEDDED");

    // Create service and scheduler
    println!("2. Wiring service and scheduler...");
    let service = Arc::new(PollingBroadcastService::new(
        config.clone(),
        announce,
        source,
        registry,
        store,
        broadcaster,
    )?);
    let scheduler =
        RetryingScheduler::new(config, Arc::clone(&service) as Arc<dyn TickHandler>);

    // Run the scheduler in the background
    println!("3. Starting scheduler...\n");
    scheduler.start().await;

    // Let two tick cycles pass; only the first announces (the watermark
    // makes the second a no-op)
    tokio::time::sleep(Duration::from_millis(1500)).await;

    println!("4. Application can do other work here.");
    println!(
        "   Announced watermark: {:?}",
        service.last_watermark().await
    );

    // Stop the scheduler; waits for any in-flight tick
    println!("5. Stopping scheduler...");
    scheduler.stop().await;

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Scheduler lifecycle is fully controlled by the application");
    println!(
        "- One announcement sent across {} webhook call(s), duplicates suppressed",
        send_calls.load(Ordering::SeqCst)
    );
    println!("- All collaborators are custom (not resetcastd defaults)");

    Ok(())
}
