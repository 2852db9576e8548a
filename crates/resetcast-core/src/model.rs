//! Value types shared across the resetcast engine
//!
//! The snapshot types mirror the content API payload and are decoded with
//! serde. Everything here is transient per tick except [`Watermark`], which is
//! the single durable value the engine owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The last externally-observed reset timestamp that was already announced
///
/// Opaque to everything except the change detector, which only compares it
/// for equality. Persists across restarts via a [`WatermarkStore`].
///
/// [`WatermarkStore`]: crate::traits::WatermarkStore
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Watermark(i64);

impl Watermark {
    /// Create a watermark from a unix timestamp in seconds
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The underlying unix timestamp in seconds
    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fetch's full external state payload
///
/// Transient; created fresh every tick and discarded afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSnapshot {
    /// Timestamp of the next rotation reset; absent means the payload is
    /// incomplete and nothing should be announced this tick
    #[serde(default)]
    pub next_reset: Option<Watermark>,

    /// Lootable locations for the current rotation
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// One lootable location within a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

/// One loot table entry at a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    #[serde(default)]
    pub entity: Option<Entity>,
}

/// A content entity referenced by a loot entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Rarity tier; only entities at the configured tier are announced
    #[serde(default)]
    pub tier: Option<u8>,

    /// Category segment of the entity's database deep link
    #[serde(default)]
    pub main_category_id: Option<String>,

    /// When present, announce this output item instead of the schematic itself
    #[serde(default)]
    pub schematic_output_item: Option<Box<Entity>>,
}

/// A deduplicated, announce-ready entity extracted from a snapshot
///
/// Unique by `id` within one announcement; ordered by display name,
/// case-insensitive ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementItem {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
}

/// One registered broadcast destination
///
/// Owned by the external registration store; read-only to this engine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTarget {
    /// Guild the destination belongs to; determines the owning shard
    pub guild_id: u64,

    /// Channel the registered webhook posts into
    pub channel_id: String,

    /// Registered webhook id; must match a live webhook in the channel
    pub webhook_id: String,

    /// Registered webhook token; must match the live webhook's token
    pub webhook_token: String,
}

// The webhook token is a credential; keep it out of logs.
impl fmt::Debug for BroadcastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastTarget")
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("webhook_id", &self.webhook_id)
            .field("webhook_token", &"<redacted>")
            .finish()
    }
}

/// Per-target result of one broadcast cycle
///
/// Used only for logging and metrics; never changes control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Message sent via the registered webhook
    Delivered,
    /// Target belongs to a shard this process has no gateway for
    SkippedNotOwned,
    /// Channel absent, not text-capable, or a thread
    SkippedInvalidChannel,
    /// No live webhook matched the registered id/token pair
    SkippedWebhookMismatch,
    /// Stale-message cleanup failed; the new message was still sent
    FailedCleanup,
    /// Webhook send failed
    FailedSend,
}

/// Channel metadata as seen through a shard gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub is_text: bool,
    pub is_thread: bool,
}

impl ChannelInfo {
    /// Whether announcements may be posted into this channel
    pub fn is_broadcastable(&self) -> bool {
        self.is_text && !self.is_thread
    }
}

/// Webhook metadata as seen through a shard gateway
///
/// The token is only visible for webhooks the bot owns.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookInfo {
    pub id: String,
    pub token: Option<String>,
}

impl fmt::Debug for WebhookInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookInfo")
            .field("id", &self.id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Message metadata needed for stale-announcement cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: String,
    /// Set when the message was posted by a webhook
    pub webhook_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
