//! Retrying tick scheduler
//!
//! The RetryingScheduler wraps an arbitrary unit of work in lifecycle
//! management, interval scheduling, and a bounded retry budget:
//!
//! - `start()` transitions Stopped → Running, runs one immediate tick, then
//!   schedules a tick every `interval`
//! - `stop()` transitions Running → Stopped, cancels the pending timer, and
//!   waits for any in-flight tick to observe cancellation at its next
//!   suspension point
//! - A failed tick is retried up to `retry_attempts` additional times with a
//!   fixed `retry_delay`; exhaustion is logged and swallowed: a failed tick
//!   never crashes the process and never cancels future ticks
//! - Exactly one tick executes at a time per scheduler; a tick that overruns
//!   the interval delays the next tick instead of overlapping it
//!
//! The attempt budget resets on every scheduled tick.

use crate::config::ServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// The unit of work driven by a [`RetryingScheduler`]
#[async_trait]
pub trait TickHandler: Send + Sync {
    /// Called once when the scheduler starts, before the first tick
    async fn on_start(&self) {}

    /// One execution of the scheduled unit of work
    ///
    /// An `Err` makes the scheduler retry according to its configured budget.
    async fn tick(&self) -> Result<()>;

    /// Called once after the scheduler loop exits
    async fn on_stop(&self) {}
}

struct Running {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

/// Lifecycle-managed interval scheduler with bounded retry
///
/// States: `Stopped → Running → Stopped`. `start()` on a running scheduler
/// and `stop()` on a stopped one are no-ops.
pub struct RetryingScheduler {
    config: ServiceConfig,
    handler: Arc<dyn TickHandler>,
    running: Mutex<Option<Running>>,
}

impl RetryingScheduler {
    pub fn new(config: ServiceConfig, handler: Arc<dyn TickHandler>) -> Self {
        Self {
            config,
            handler,
            running: Mutex::new(None),
        }
    }

    /// Whether the scheduler loop is currently running
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Start the scheduler: one immediate tick, then one every interval
    pub async fn start(&self) {
        let mut guard = self.running.lock().await;
        if guard.is_some() {
            debug!(service = %self.config.name, "scheduler already running");
            return;
        }
        if !self.config.enabled {
            info!(service = %self.config.name, "service disabled, not starting");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handler = Arc::clone(&self.handler);
        let config = self.config.clone();
        let join = tokio::spawn(run_loop(handler, config, shutdown_rx));

        *guard = Some(Running { shutdown_tx, join });
        info!(service = %self.config.name, interval_secs = self.config.interval_secs, "service started");
    }

    /// Stop the scheduler and wait for the loop (and any in-flight tick) to
    /// finish
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();
        let Some(running) = running else {
            debug!(service = %self.config.name, "scheduler not running");
            return;
        };

        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.join.await {
            error!(service = %self.config.name, "scheduler task join failed: {e}");
        }
    }
}

async fn run_loop(
    handler: Arc<dyn TickHandler>,
    config: ServiceConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    handler.on_start().await;

    let mut interval = tokio::time::interval(config.interval());
    // An overrunning tick delays the next one rather than stacking up
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_tick_with_retry(handler.as_ref(), &config, &mut shutdown_rx).await;
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    handler.on_stop().await;
    info!(service = %config.name, "service stopped");
}

/// Run one tick, retrying with a fixed delay until the budget is exhausted
///
/// Errors never escape: an exhausted budget is logged and the scheduler waits
/// for the next interval with a fresh budget.
async fn run_tick_with_retry(
    handler: &dyn TickHandler,
    config: &ServiceConfig,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    for attempt in 0..=config.retry_attempts {
        match handler.tick().await {
            Ok(()) => return,
            Err(e) if attempt < config.retry_attempts => {
                warn!(
                    service = %config.name,
                    attempt = attempt + 1,
                    error = %e,
                    "tick failed, retrying after {}s",
                    config.retry_delay_secs
                );
                tokio::select! {
                    _ = tokio::time::sleep(config.retry_delay()) => {}
                    _ = shutdown_rx.changed() => return,
                }
            }
            Err(e) => {
                error!(
                    service = %config.name,
                    attempts = config.retry_attempts + 1,
                    error = %e,
                    "tick failed after all attempts, waiting for next interval"
                );
            }
        }
    }
}
