//! Retry budget contract
//!
//! Runs [`RetryingScheduler`] under a paused clock and verifies the bounded
//! attempt budget: retries with a fixed delay inside one cycle, exhaustion
//! without crashing, and a fresh budget on the next scheduled tick.

mod common;

use common::{
    CountingTickHandler, CountingWatermarkStore, FixedTargetRegistry, MockShardGateway,
    ScriptedSnapshotSource, snapshot_with_entities, target,
};
use resetcast_core::{
    AnnouncementConfig, PollingBroadcastService, RetryingScheduler, ServiceConfig,
    ShardFanoutBroadcaster, TickHandler,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn retry_config() -> ServiceConfig {
    ServiceConfig::new("weekly-reset")
        .with_interval(Duration::from_secs(3600))
        .with_retries(3, Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn failing_tick_uses_the_whole_attempt_budget() {
    let handler = Arc::new(CountingTickHandler::failing());
    let scheduler = RetryingScheduler::new(retry_config(), Arc::clone(&handler) as Arc<dyn TickHandler>);

    scheduler.start().await;
    // 1 initial attempt + 3 retries, 1s apart
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handler.ticks(), 4);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn attempt_budget_is_fresh_every_interval() {
    let handler = Arc::new(CountingTickHandler::failing());
    let scheduler = RetryingScheduler::new(retry_config(), Arc::clone(&handler) as Arc<dyn TickHandler>);

    scheduler.start().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handler.ticks(), 4);

    // Exhaustion does not cancel the schedule; the next cycle retries again
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(handler.ticks(), 8);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn successful_tick_is_never_retried() {
    let handler = Arc::new(CountingTickHandler::succeeding());
    let scheduler = RetryingScheduler::new(retry_config(), Arc::clone(&handler) as Arc<dyn TickHandler>);

    scheduler.start().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handler.ticks(), 1);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(handler.ticks(), 2);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn exhausted_fetch_budget_broadcasts_nothing() {
    let source = ScriptedSnapshotSource::failing();
    let fetches = source.fetch_counter();
    let store = CountingWatermarkStore::new();
    let gateway = MockShardGateway::new(0, 1)
        .with_text_channel("chan-1")
        .with_webhook("chan-1", "hook-1", "tok-1");
    let sent = Arc::clone(&gateway.sent);

    let config = retry_config();
    let service = Arc::new(
        PollingBroadcastService::new(
            config.clone(),
            AnnouncementConfig::new("weekly-reset:last", "DEEP_DESERT"),
            Arc::new(source),
            Arc::new(FixedTargetRegistry::new(vec![target(
                0, "chan-1", "hook-1", "tok-1",
            )])),
            Arc::new(store.clone()),
            ShardFanoutBroadcaster::new(vec![Arc::new(gateway)]),
        )
        .expect("valid fixture configuration"),
    );
    let scheduler = RetryingScheduler::new(config, service);

    scheduler.start().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 4);
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(store.save_count(), 0);

    // Next cycle gets a fresh budget
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 8);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn transient_fetch_failure_recovers_within_the_budget() {
    let snapshot = snapshot_with_entities(9000, &[("e1", "Artifact", 6)]);
    let source = ScriptedSnapshotSource::fail_then(2, snapshot);
    let fetches = source.fetch_counter();
    let store = CountingWatermarkStore::new();
    let gateway = MockShardGateway::new(0, 1)
        .with_text_channel("chan-1")
        .with_webhook("chan-1", "hook-1", "tok-1");
    let sent = Arc::clone(&gateway.sent);

    let config = retry_config();
    let service = Arc::new(
        PollingBroadcastService::new(
            config.clone(),
            AnnouncementConfig::new("weekly-reset:last", "DEEP_DESERT"),
            Arc::new(source),
            Arc::new(FixedTargetRegistry::new(vec![target(
                0, "chan-1", "hook-1", "tok-1",
            )])),
            Arc::new(store.clone()),
            ShardFanoutBroadcaster::new(vec![Arc::new(gateway)]),
        )
        .expect("valid fixture configuration"),
    );
    let scheduler = RetryingScheduler::new(config, service);

    scheduler.start().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Two failed attempts, then the third succeeds and announces once
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert_eq!(store.save_count(), 1);

    scheduler.stop().await;
}
