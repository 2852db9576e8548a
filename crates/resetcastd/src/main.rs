// # resetcastd - Broadcast Daemon
//
// Thin integration layer for the resetcast engine:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the snapshot source, gateways, registry, and state store
// 4. Running the scheduler until a shutdown signal arrives
//
// All broadcast logic lives in resetcast-core; nothing here makes decisions.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Content API
// - `RESETCAST_CONTENT_URL`: Base URL of the content API
// - `RESETCAST_CONTENT_KEY`: Content key to fetch (e.g. deep-desert-1)
// - `RESETCAST_LANG`: Language for content and deep links (default: en)
//
// ### Discord
// - `RESETCAST_DISCORD_TOKEN`: Bot token used for channel/webhook lookups
// - `RESETCAST_SHARD_COUNT`: Number of execution shards (default: 1)
//
// ### Registration & State
// - `RESETCAST_TARGETS_PATH`: Path to the JSON target registration export
// - `RESETCAST_STATE_PATH`: Path to the watermark state file
// - `RESETCAST_TARGET_KIND`: Registration kind to broadcast (default: DEEP_DESERT)
//
// ### Scheduling
// - `RESETCAST_INTERVAL_SECS`: Tick interval (default: 3600)
// - `RESETCAST_RETRY_ATTEMPTS`: Extra attempts per failed tick (default: 3)
// - `RESETCAST_RETRY_DELAY_SECS`: Delay between attempts (default: 10)
// - `RESETCAST_TIER`: Rarity tier to announce (default: 6)
// - `RESETCAST_LOG_LEVEL`: trace|debug|info|warn|error (default: info)

use anyhow::Result;
use resetcast_core::{
    AnnouncementConfig, FileTargetRegistry, FileWatermarkStore, PollingBroadcastService,
    RetryingScheduler, ServiceConfig, ShardFanoutBroadcaster, ShardGateway,
};
use resetcast_source_http::HttpSnapshotSource;
use resetcast_transport_discord::DiscordGateway;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    content_url: String,
    content_key: String,
    lang: String,
    discord_token: String,
    shard_count: u32,
    targets_path: String,
    state_path: String,
    target_kind: String,
    interval_secs: u64,
    retry_attempts: u32,
    retry_delay_secs: u64,
    tier: u8,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            content_url: env::var("RESETCAST_CONTENT_URL")?,
            content_key: env::var("RESETCAST_CONTENT_KEY")?,
            lang: env::var("RESETCAST_LANG").unwrap_or_else(|_| "en".to_string()),
            discord_token: env::var("RESETCAST_DISCORD_TOKEN")?,
            shard_count: env::var("RESETCAST_SHARD_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            targets_path: env::var("RESETCAST_TARGETS_PATH")?,
            state_path: env::var("RESETCAST_STATE_PATH")
                .unwrap_or_else(|_| "/var/lib/resetcast/state.json".to_string()),
            target_kind: env::var("RESETCAST_TARGET_KIND")
                .unwrap_or_else(|_| "DEEP_DESERT".to_string()),
            interval_secs: env::var("RESETCAST_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            retry_attempts: env::var("RESETCAST_RETRY_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_secs: env::var("RESETCAST_RETRY_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            tier: env::var("RESETCAST_TIER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            log_level: env::var("RESETCAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.discord_token.is_empty() {
            anyhow::bail!(
                "RESETCAST_DISCORD_TOKEN is required. \
                Set it via: export RESETCAST_DISCORD_TOKEN=your_token"
            );
        }

        if !self.content_url.starts_with("https://") && !self.content_url.starts_with("http://") {
            anyhow::bail!(
                "RESETCAST_CONTENT_URL must use HTTP or HTTPS scheme. Got: {}",
                self.content_url
            );
        }

        if self.shard_count == 0 {
            anyhow::bail!("RESETCAST_SHARD_COUNT must be at least 1");
        }

        if !(60..=86_400).contains(&self.interval_secs) {
            anyhow::bail!(
                "RESETCAST_INTERVAL_SECS must be between 60 and 86400. Got: {}",
                self.interval_secs
            );
        }

        if self.retry_attempts > 10 {
            anyhow::bail!(
                "RESETCAST_RETRY_ATTEMPTS must be at most 10. Got: {}",
                self.retry_attempts
            );
        }

        if self.targets_path.is_empty() {
            anyhow::bail!(
                "RESETCAST_TARGETS_PATH is required. \
                Set it via: export RESETCAST_TARGETS_PATH=/etc/resetcast/targets.json"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "RESETCAST_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting resetcastd daemon");
    info!(
        "Shards: {}, interval: {}s, tier: {}",
        config.shard_count, config.interval_secs, config.tier
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the components and run the scheduler until shutdown
async fn run_daemon(config: Config) -> Result<()> {
    let source = Arc::new(HttpSnapshotSource::new(
        &config.content_url,
        &config.content_key,
        &config.lang,
    )?);

    let registry = Arc::new(FileTargetRegistry::new(&config.targets_path));
    let store = Arc::new(FileWatermarkStore::new(&config.state_path).await?);

    let mut gateways: Vec<Arc<dyn ShardGateway>> = Vec::with_capacity(config.shard_count as usize);
    for shard_id in 0..config.shard_count {
        gateways.push(Arc::new(DiscordGateway::new(
            shard_id,
            config.shard_count,
            config.discord_token.clone(),
        )?));
    }
    let broadcaster = ShardFanoutBroadcaster::new(gateways);

    let service_config = ServiceConfig::new("deep-desert")
        .with_interval(Duration::from_secs(config.interval_secs))
        .with_retries(
            config.retry_attempts,
            Duration::from_secs(config.retry_delay_secs),
        );

    let announce = AnnouncementConfig::new("deep-desert:last-reset", &config.target_kind)
        .with_tier(config.tier);

    let service = Arc::new(PollingBroadcastService::new(
        service_config.clone(),
        announce,
        source,
        registry,
        store,
        broadcaster,
    )?);

    let scheduler = RetryingScheduler::new(service_config, service);
    scheduler.start().await;

    let signal_name = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal_name);

    scheduler.stop().await;
    info!("Daemon stopped cleanly");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for CTRL-C (fallback for non-Unix platforms)
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
