// # Shard Gateway Trait
//
// Defines the per-shard interface to the chat platform: channel resolution,
// webhook lookup, message history, deletion, and webhook sends.
//
// ## Implementations
//
// - Discord REST: `resetcast-transport-discord` crate
// - Test doubles: scripted gateways in the contract tests
//
// ## Contract
//
// One gateway instance exists per execution shard and answers only for the
// channels that shard owns. Implementations are stateless and single-shot:
//
// - No retry or backoff logic (the engine owns the retry policy)
// - No caching of channels, webhooks, or messages beyond one call
// - No background tasks
// - Webhook tokens must never appear in logs or error messages
//
// Every method is one platform API call; the broadcaster sequences them.

use crate::error::Result;
use crate::model::{ChannelInfo, MessageInfo, WebhookInfo};
use async_trait::async_trait;

/// Trait for per-shard platform gateway implementations
#[async_trait]
pub trait ShardGateway: Send + Sync {
    /// The shard this gateway executes on
    fn shard_id(&self) -> u32;

    /// Total number of shards in the deployment
    fn total_shards(&self) -> u32;

    /// Resolve a channel by id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ChannelInfo))`: The channel exists and is visible
    /// - `Ok(None)`: The channel is absent or inaccessible
    /// - `Err(Error)`: Platform failure
    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>>;

    /// List the webhooks configured in a channel
    async fn list_webhooks(&self, channel_id: &str) -> Result<Vec<WebhookInfo>>;

    /// Fetch the most recent messages in a channel, newest first
    ///
    /// `limit` is capped by the platform (100 on Discord).
    async fn recent_messages(&self, channel_id: &str, limit: u8) -> Result<Vec<MessageInfo>>;

    /// Delete a single message
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()>;

    /// Delete a batch of messages in one call
    async fn bulk_delete(&self, channel_id: &str, message_ids: &[String]) -> Result<()>;

    /// Post `content` through the given webhook
    async fn send_webhook_message(
        &self,
        webhook_id: &str,
        webhook_token: &str,
        content: &str,
    ) -> Result<()>;
}
