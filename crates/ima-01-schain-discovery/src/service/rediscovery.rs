//! Background rediscovery.
//!
//! A ticker task fires every `repeat_interval`. Each tick either starts a
//! pass in its own task or, when the previous pass is still running, is
//! dropped. Once an installed roster is complete the ticker is aborted and
//! the scheduler returns to `Idle`.

use super::{DiscoveryService, RosterStore};
use crate::ports::RosterView;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No ticker: never started, disabled, or the roster is complete.
    Idle,
    /// Ticker armed, no pass running.
    Scheduled,
    /// A pass is in flight.
    Running,
}

/// Pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RediscoveryStats {
    /// Passes started.
    pub passes_started: u64,
    /// Ticks dropped because a pass was in flight.
    pub passes_skipped: u64,
    /// Passes that ended in an error.
    pub passes_failed: u64,
}

/// Keeps the roster fresh until every node is discovered.
pub struct RediscoveryScheduler {
    discovery: Arc<DiscoveryService>,
    store: Arc<RosterStore>,
    min_quorum: Option<usize>,
    in_flight: AtomicBool,
    ticker: Mutex<Option<JoinHandle<()>>>,
    started: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl RediscoveryScheduler {
    /// Scheduler refreshing `store` with passes of `discovery`.
    pub fn new(
        discovery: Arc<DiscoveryService>,
        store: Arc<RosterStore>,
        min_quorum: Option<usize>,
    ) -> Arc<Self> {
        Arc::new(Self {
            discovery,
            store,
            min_quorum,
            in_flight: AtomicBool::new(false),
            ticker: Mutex::new(None),
            started: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    /// Arm the ticker. Returns `false` without doing anything when
    /// rediscovery is disabled, the stored roster is already complete, or a
    /// ticker is already armed.
    pub fn start(self: &Arc<Self>, silent: bool) -> bool {
        let interval = self.discovery.config().repeat_interval;
        if interval.is_zero() {
            info!("[ima-01] S-Chain network re-discovery is disabled");
            return false;
        }
        if self.store.snapshot().is_some_and(|roster| roster.is_fully_discovered()) {
            debug!("[ima-01] S-Chain network already fully discovered, re-discovery not needed");
            return false;
        }

        let mut ticker = self.ticker.lock();
        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("[ima-01] S-Chain network re-discovery already scheduled");
            return false;
        }
        info!(
            interval_ms = interval.as_millis() as u64,
            "[ima-01] Will re-discover S-Chain network periodically"
        );
        let scheduler = Arc::clone(self);
        *ticker = Some(tokio::spawn(scheduler.tick_loop(interval, silent)));
        true
    }

    /// Abort the ticker. A pass already in flight runs to completion.
    pub fn stop(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
            debug!("[ima-01] S-Chain network re-discovery timer cancelled");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        let armed = self
            .ticker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        match (armed, self.in_flight.load(Ordering::SeqCst)) {
            (false, _) => SchedulerState::Idle,
            (true, true) => SchedulerState::Running,
            (true, false) => SchedulerState::Scheduled,
        }
    }

    /// Pass counters so far.
    pub fn stats(&self) -> RediscoveryStats {
        RediscoveryStats {
            passes_started: self.started.load(Ordering::Relaxed),
            passes_skipped: self.skipped.load(Ordering::Relaxed),
            passes_failed: self.failed.load(Ordering::Relaxed),
        }
    }

    async fn tick_loop(self: Arc<Self>, interval: Duration, silent: bool) {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                info!("[ima-01] Notice: long S-Chain network re-discovery is still in progress, skipping tick");
                continue;
            }
            let scheduler = Arc::clone(&self);
            tokio::spawn(async move { scheduler.run_pass(silent).await });
        }
    }

    async fn run_pass(&self, silent: bool) {
        self.started.fetch_add(1, Ordering::Relaxed);
        let previous = self.store.snapshot();
        progress!(silent, "[ima-01] Will re-discover S-Chain network");
        match self
            .discovery
            .discover(previous.as_deref(), self.min_quorum, silent)
            .await
        {
            Ok(roster) => {
                let installed = self.store.install(roster);
                progress!(
                    silent,
                    discovered = installed.discovered_count(),
                    total = installed.total(),
                    "[ima-01] S-Chain network re-discovered: {}",
                    installed.discovery_summary()
                );
                if !silent {
                    if let Ok(network) = serde_json::to_string(installed.as_ref()) {
                        debug!(%network, "[ima-01] S-Chain network information");
                    }
                }
                if installed.is_fully_discovered() {
                    info!("[ima-01] S-Chain network fully discovered, re-discovery stopped");
                    self.stop();
                }
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "[ima-01] S-Chain network re-discovery failed");
            }
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
