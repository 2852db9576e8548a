//! Configuration types for the resetcast engine
//!
//! This module defines the configuration structures that govern a single
//! polling broadcast service instance. All values are immutable after
//! construction; `validate()` is expected to be called before wiring the
//! service together.

use crate::message::MessageStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle configuration for one polling broadcast service
///
/// Governs scheduling and retry behavior. One instance per monitored source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, used for logging and the watermark cache key
    pub name: String,

    /// Whether the service runs at all; a disabled service ignores `start()`
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Interval between scheduled ticks, in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Additional attempts after a failed tick before giving up for this cycle
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between retry attempts, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl ServiceConfig {
    /// Create a configuration with defaults for the given service name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }

    /// Set the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_secs = interval.as_secs();
        self
    }

    /// Set the retry budget
    pub fn with_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay_secs = delay.as_secs().max(1);
        self
    }

    /// Enable or disable the service
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The tick interval as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The retry delay as a [`Duration`]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.is_empty() {
            return Err(crate::Error::config("service name cannot be empty"));
        }
        if self.interval_secs == 0 {
            return Err(crate::Error::config("tick interval must be > 0 seconds"));
        }
        Ok(())
    }
}

/// Announcement-selection configuration for one polling broadcast service
///
/// Controls which loot entities qualify for announcement and where the
/// rendered message is addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementConfig {
    /// Rarity tier an entity must have to be announced
    #[serde(default = "default_tier")]
    pub tier: u8,

    /// Key under which the watermark is persisted in the state store
    pub cache_key: String,

    /// Registration-store kind used to filter broadcast targets
    pub target_kind: String,

    /// Message layout and deep-link settings
    #[serde(default)]
    pub style: MessageStyle,
}

impl AnnouncementConfig {
    /// Create an announcement configuration with the default tier and style
    pub fn new(cache_key: impl Into<String>, target_kind: impl Into<String>) -> Self {
        Self {
            tier: default_tier(),
            cache_key: cache_key.into(),
            target_kind: target_kind.into(),
            style: MessageStyle::default(),
        }
    }

    /// Set the rarity tier
    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    /// Set the message style
    pub fn with_style(mut self, style: MessageStyle) -> Self {
        self.style = style;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.cache_key.is_empty() {
            return Err(crate::Error::config("cache key cannot be empty"));
        }
        if self.target_kind.is_empty() {
            return Err(crate::Error::config("target kind cannot be empty"));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    // One hour, the upstream content rotates weekly
    3600
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_tier() -> u8 {
    6
}
