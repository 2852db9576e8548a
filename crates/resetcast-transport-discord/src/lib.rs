// # Discord Shard Gateway
//
// Discord REST implementation of the `ShardGateway` trait.
//
// ## Constraints
//
// Gateways are stateless, single-shot integrations:
//
// - One HTTP request per gateway method (the broadcaster sequences them)
// - NO retry or backoff logic (owned by the scheduler)
// - NO caching of channels, webhooks, or messages (re-resolved every cycle)
// - NO background tasks
// - Webhook and bot tokens never appear in logs or error messages
//
// ## API Reference
//
// - Discord REST v10: https://discord.com/developers/docs/reference
// - Get Channel: GET `/channels/{channel.id}`
// - Get Channel Webhooks: GET `/channels/{channel.id}/webhooks`
// - Get Channel Messages: GET `/channels/{channel.id}/messages?limit=N`
// - Delete Message: DELETE `/channels/{channel.id}/messages/{message.id}`
// - Bulk Delete Messages: POST `/channels/{channel.id}/messages/bulk-delete`
// - Execute Webhook: POST `/webhooks/{webhook.id}/{webhook.token}`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resetcast_core::model::{ChannelInfo, MessageInfo, WebhookInfo};
use resetcast_core::traits::ShardGateway;
use resetcast_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Discord REST API base URL
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// Channel type codes, per the Discord channel object
const CHANNEL_GUILD_TEXT: u8 = 0;
const CHANNEL_GUILD_ANNOUNCEMENT: u8 = 5;
const CHANNEL_ANNOUNCEMENT_THREAD: u8 = 10;
const CHANNEL_PUBLIC_THREAD: u8 = 11;
const CHANNEL_PRIVATE_THREAD: u8 = 12;

#[derive(Debug, Deserialize)]
struct ApiChannel {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Deserialize)]
struct ApiWebhook {
    id: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    id: String,
    webhook_id: Option<String>,
    timestamp: DateTime<Utc>,
}

/// Discord REST gateway for one execution shard
///
/// Answers channel, webhook, and message operations for the guilds this shard
/// owns. Construction is cheap; one instance per shard is expected.
pub struct DiscordGateway {
    shard_id: u32,
    total_shards: u32,
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl DiscordGateway {
    /// Create a gateway for the given shard
    pub fn new(shard_id: u32, total_shards: u32, bot_token: impl Into<String>) -> Result<Self> {
        let bot_token = bot_token.into();
        if bot_token.is_empty() {
            return Err(Error::config("Discord bot token cannot be empty"));
        }
        if total_shards == 0 || shard_id >= total_shards {
            return Err(Error::config(format!(
                "invalid shard assignment: {shard_id} of {total_shards}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            shard_id,
            total_shards,
            bot_token,
            api_base: DISCORD_API_BASE.to_string(),
            client,
        })
    }

    /// Override the API base URL, for tests against a local stub
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Map a non-success response to an error without echoing the body
    /// verbatim (bodies can include webhook URLs)
    fn status_error(context: &str, status: reqwest::StatusCode) -> Error {
        Error::gateway(format!("{context}: HTTP {status}"))
    }
}

#[async_trait]
impl ShardGateway for DiscordGateway {
    fn shard_id(&self) -> u32 {
        self.shard_id
    }

    fn total_shards(&self) -> u32 {
        self.total_shards
    }

    async fn resolve_channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        let url = format!("{}/channels/{}", self.api_base, channel_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Error::http(format!("channel request failed: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let channel: ApiChannel = response
                    .json()
                    .await
                    .map_err(|e| Error::gateway(format!("channel decode failed: {e}")))?;
                Ok(Some(ChannelInfo {
                    id: channel.id,
                    is_text: matches!(
                        channel.kind,
                        CHANNEL_GUILD_TEXT | CHANNEL_GUILD_ANNOUNCEMENT
                    ),
                    is_thread: matches!(
                        channel.kind,
                        CHANNEL_ANNOUNCEMENT_THREAD
                            | CHANNEL_PUBLIC_THREAD
                            | CHANNEL_PRIVATE_THREAD
                    ),
                }))
            }
            reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::FORBIDDEN => Ok(None),
            status => Err(Self::status_error("channel lookup", status)),
        }
    }

    async fn list_webhooks(&self, channel_id: &str) -> Result<Vec<WebhookInfo>> {
        let url = format!("{}/channels/{}/webhooks", self.api_base, channel_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Error::http(format!("webhook listing failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error("webhook listing", response.status()));
        }

        let webhooks: Vec<ApiWebhook> = response
            .json()
            .await
            .map_err(|e| Error::gateway(format!("webhook decode failed: {e}")))?;

        Ok(webhooks
            .into_iter()
            .map(|webhook| WebhookInfo {
                id: webhook.id,
                token: webhook.token,
            })
            .collect())
    }

    async fn recent_messages(&self, channel_id: &str, limit: u8) -> Result<Vec<MessageInfo>> {
        let url = format!(
            "{}/channels/{}/messages?limit={}",
            self.api_base, channel_id, limit
        );
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Error::http(format!("history fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error("history fetch", response.status()));
        }

        let messages: Vec<ApiMessage> = response
            .json()
            .await
            .map_err(|e| Error::gateway(format!("history decode failed: {e}")))?;

        Ok(messages
            .into_iter()
            .map(|msg| MessageInfo {
                id: msg.id,
                webhook_id: msg.webhook_id,
                created_at: msg.timestamp,
            })
            .collect())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.api_base, channel_id, message_id
        );
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Error::http(format!("message delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error("message delete", response.status()));
        }
        Ok(())
    }

    async fn bulk_delete(&self, channel_id: &str, message_ids: &[String]) -> Result<()> {
        let url = format!(
            "{}/channels/{}/messages/bulk-delete",
            self.api_base, channel_id
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "messages": message_ids }))
            .send()
            .await
            .map_err(|e| Error::http(format!("bulk delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::status_error("bulk delete", response.status()));
        }
        Ok(())
    }

    async fn send_webhook_message(
        &self,
        webhook_id: &str,
        webhook_token: &str,
        content: &str,
    ) -> Result<()> {
        // Webhook execution authenticates via the token in the path; no bot
        // auth header, and the URL must never be logged
        let url = format!("{}/webhooks/{}/{}", self.api_base, webhook_id, webhook_token);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|_| Error::http("webhook execution request failed".to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error("webhook execution", response.status()));
        }
        Ok(())
    }
}
