//! Shard-partitioned fan-out broadcast
//!
//! Delivers one rendered message to every registered target exactly once.
//! The full target list and message are scattered to every shard gateway;
//! each shard independently filters down to the targets it owns and processes
//! them sequentially: resolve channel → match webhook → delete stale
//! announcements → send. A failure on one target never prevents processing of
//! the next, and no shard waits on another.

use crate::model::{BroadcastTarget, DeliveryOutcome};
use crate::traits::ShardGateway;
use chrono::{Duration as ChronoDuration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stale-announcement retention horizon: prior webhook posts younger than
/// this are deleted before the new announcement goes out
const RETENTION_DAYS: i64 = 14;

/// Bounded history window inspected during cleanup
const HISTORY_LIMIT: u8 = 100;

/// Deterministic shard ownership: which shard owns a guild
///
/// Uses the platform's partition function, total over all guild ids.
pub fn shard_for_guild(guild_id: u64, total_shards: u32) -> u32 {
    debug_assert!(total_shards > 0);
    ((guild_id >> 22) % u64::from(total_shards)) as u32
}

/// Shard-partitioned broadcaster over a set of per-shard gateways
pub struct ShardFanoutBroadcaster {
    gateways: Vec<Arc<dyn ShardGateway>>,
}

impl ShardFanoutBroadcaster {
    pub fn new(gateways: Vec<Arc<dyn ShardGateway>>) -> Self {
        Self { gateways }
    }

    /// Deliver `message` to every target, partitioned by owning shard
    ///
    /// Returns one outcome per target, in target order. Targets whose owning
    /// shard has no registered gateway are reported as `SkippedNotOwned`.
    pub async fn broadcast(
        &self,
        targets: &[BroadcastTarget],
        message: &str,
    ) -> Vec<DeliveryOutcome> {
        let mut outcomes = vec![DeliveryOutcome::SkippedNotOwned; targets.len()];

        // Scatter: every shard receives the full list; no shard waits on
        // another, the orchestrator waits for all of them
        let shard_runs = self
            .gateways
            .iter()
            .map(|gateway| broadcast_on_shard(Arc::clone(gateway), targets, message));

        for shard_outcomes in join_all(shard_runs).await {
            for (index, outcome) in shard_outcomes {
                outcomes[index] = outcome;
            }
        }

        let delivered = outcomes
            .iter()
            .filter(|o| **o == DeliveryOutcome::Delivered)
            .count();
        info!(
            delivered,
            total = targets.len(),
            "broadcast cycle complete"
        );

        outcomes
    }
}

/// Process the subset of `targets` owned by this shard, sequentially
async fn broadcast_on_shard(
    gateway: Arc<dyn ShardGateway>,
    targets: &[BroadcastTarget],
    message: &str,
) -> Vec<(usize, DeliveryOutcome)> {
    let shard_id = gateway.shard_id();
    let total = gateway.total_shards();

    let owned: Vec<(usize, &BroadcastTarget)> = targets
        .iter()
        .enumerate()
        .filter(|(_, target)| shard_for_guild(target.guild_id, total) == shard_id)
        .collect();

    debug!(shard_id, owned = owned.len(), "shard broadcast starting");

    let mut outcomes = Vec::with_capacity(owned.len());
    for (index, target) in owned {
        let outcome = deliver_to_target(gateway.as_ref(), target, message).await;
        if outcome != DeliveryOutcome::Delivered {
            warn!(
                shard_id,
                channel_id = %target.channel_id,
                ?outcome,
                "target not delivered cleanly"
            );
        }
        outcomes.push((index, outcome));
    }

    outcomes
}

/// Deliver to a single target: resolve → match webhook → cleanup → send
///
/// Every failure is contained to this target; the caller moves on to the next
/// regardless of the outcome.
async fn deliver_to_target(
    gateway: &dyn ShardGateway,
    target: &BroadcastTarget,
    message: &str,
) -> DeliveryOutcome {
    let channel = match gateway.resolve_channel(&target.channel_id).await {
        Ok(Some(channel)) => channel,
        Ok(None) => {
            debug!(channel_id = %target.channel_id, "channel not found");
            return DeliveryOutcome::SkippedInvalidChannel;
        }
        Err(e) => {
            warn!(channel_id = %target.channel_id, "channel resolution failed: {e}");
            return DeliveryOutcome::SkippedInvalidChannel;
        }
    };

    if !channel.is_broadcastable() {
        debug!(channel_id = %target.channel_id, "channel is not broadcastable");
        return DeliveryOutcome::SkippedInvalidChannel;
    }

    let webhooks = match gateway.list_webhooks(&target.channel_id).await {
        Ok(webhooks) => webhooks,
        Err(e) => {
            warn!(channel_id = %target.channel_id, "webhook listing failed: {e}");
            return DeliveryOutcome::FailedSend;
        }
    };

    let registered = webhooks.iter().find(|webhook| {
        webhook.id == target.webhook_id
            && webhook.token.as_deref() == Some(target.webhook_token.as_str())
    });
    if registered.is_none() {
        debug!(channel_id = %target.channel_id, "no webhook matched the registration");
        return DeliveryOutcome::SkippedWebhookMismatch;
    }

    let cleanup_failed = !cleanup_stale_announcements(gateway, target).await;

    match gateway
        .send_webhook_message(&target.webhook_id, &target.webhook_token, message)
        .await
    {
        Ok(()) if cleanup_failed => DeliveryOutcome::FailedCleanup,
        Ok(()) => DeliveryOutcome::Delivered,
        Err(e) => {
            warn!(channel_id = %target.channel_id, "webhook send failed: {e}");
            DeliveryOutcome::FailedSend
        }
    }
}

/// Delete this webhook's prior announcements inside the retention horizon
///
/// Bounds channel clutter to one live announcement per retention window.
/// Returns false when cleanup failed; the caller still sends the new message.
async fn cleanup_stale_announcements(
    gateway: &dyn ShardGateway,
    target: &BroadcastTarget,
) -> bool {
    let history = match gateway
        .recent_messages(&target.channel_id, HISTORY_LIMIT)
        .await
    {
        Ok(history) => history,
        Err(e) => {
            warn!(channel_id = %target.channel_id, "history fetch failed: {e}");
            return false;
        }
    };

    let horizon = Utc::now() - ChronoDuration::days(RETENTION_DAYS);
    let stale: Vec<String> = history
        .into_iter()
        .filter(|msg| {
            msg.webhook_id.as_deref() == Some(target.webhook_id.as_str())
                && msg.created_at > horizon
        })
        .map(|msg| msg.id)
        .collect();

    if stale.is_empty() {
        return true;
    }

    // Bulk deletion only pays off past a single message
    let result = if stale.len() == 1 {
        gateway.delete_message(&target.channel_id, &stale[0]).await
    } else {
        gateway.bulk_delete(&target.channel_id, &stale).await
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(channel_id = %target.channel_id, "stale message cleanup failed: {e}");
            false
        }
    }
}
