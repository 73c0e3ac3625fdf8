//! Copies roster counts and loop statistics into the Prometheus registry.

use ima_01_schain_discovery::{RediscoveryScheduler, RediscoveryStats, RosterView};
use ima_03_transfer_loop::{TransferLoop, TransferLoopStats};
use ima_telemetry::{
    DISCOVERY_NODES_DISCOVERED, DISCOVERY_NODES_TOTAL, DISCOVERY_PASSES, TRANSFER_CYCLES,
};
use prometheus::IntCounterVec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Sampling period.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic metrics sampler.
///
/// Components keep cumulative counters; the sampler adds the growth since
/// its previous sample to the Prometheus counters.
pub struct MetricsSampler {
    roster: Arc<dyn RosterView>,
    scheduler: Option<Arc<RediscoveryScheduler>>,
    transfer_loop: Arc<TransferLoop>,
    last_passes: RediscoveryStats,
    last_cycles: TransferLoopStats,
}

impl MetricsSampler {
    pub fn new(
        roster: Arc<dyn RosterView>,
        scheduler: Option<Arc<RediscoveryScheduler>>,
        transfer_loop: Arc<TransferLoop>,
    ) -> Self {
        Self {
            roster,
            scheduler,
            transfer_loop,
            last_passes: RediscoveryStats::default(),
            last_cycles: TransferLoopStats::default(),
        }
    }

    /// Take one sample.
    pub fn sample(&mut self) {
        let (discovered, total) = self.roster.counts();
        DISCOVERY_NODES_TOTAL.set(to_i64(total));
        DISCOVERY_NODES_DISCOVERED.set(to_i64(discovered));

        if let Some(scheduler) = &self.scheduler {
            let passes = scheduler.stats();
            let last = self.last_passes;
            add(&DISCOVERY_PASSES, "started", passes.passes_started, last.passes_started);
            add(&DISCOVERY_PASSES, "skipped", passes.passes_skipped, last.passes_skipped);
            add(&DISCOVERY_PASSES, "failed", passes.passes_failed, last.passes_failed);
            self.last_passes = passes;
        }

        let cycles = self.transfer_loop.stats();
        let last = self.last_cycles;
        add(&TRANSFER_CYCLES, "completed", cycles.completed, last.completed);
        add(&TRANSFER_CYCLES, "skipped", cycles.skipped, last.skipped);
        add(&TRANSFER_CYCLES, "failed", cycles.failed, last.failed);
        self.last_cycles = cycles;
    }

    /// Sample every [`SAMPLE_INTERVAL`] until `shutdown` flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(SAMPLE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sample(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.sample();
        debug!("[ima-agent] Metrics sampler stopped");
    }
}

fn add(counter: &IntCounterVec, outcome: &str, now: u64, before: u64) {
    let delta = now.saturating_sub(before);
    if delta > 0 {
        counter.with_label_values(&[outcome]).inc_by(delta);
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
