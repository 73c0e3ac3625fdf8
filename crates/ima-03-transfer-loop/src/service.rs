//! # Transfer Loop Orchestrator
//!
//! `run_once` consults the time-frame scheduler and, when this node owns the
//! slot, runs both transfer directions. `run_forever` repeats it with a
//! fixed pause between the end of one cycle and the start of the next.

use crate::domain::{TransferDirection, TransferLoopError};
use crate::ports::TransferPort;
use ima_02_time_framing::TimeFrameScheduler;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default pause between cycles.
pub const DEFAULT_LOOP_PERIOD: Duration = Duration::from_secs(10);

/// Successful cycle outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Not this node's slot; nothing was attempted.
    Skipped,
    /// Both directions succeeded.
    Completed,
}

/// Cycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferLoopStats {
    /// Calls to `run_once`.
    pub cycles: u64,
    /// Cycles skipped by time framing.
    pub skipped: u64,
    /// Cycles where both directions succeeded.
    pub completed: u64,
    /// Cycles where at least one direction failed.
    pub failed: u64,
}

/// Drives the repeating transfer cycle.
pub struct TransferLoop {
    transfer: Arc<dyn TransferPort>,
    framing: Arc<TimeFrameScheduler>,
    loop_period: Duration,
    cycles: AtomicU64,
    skipped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl TransferLoop {
    /// Loop over `transfer`, gated by `framing`, pausing `loop_period`
    /// between cycles.
    pub fn new(
        transfer: Arc<dyn TransferPort>,
        framing: Arc<TimeFrameScheduler>,
        loop_period: Duration,
    ) -> Self {
        Self {
            transfer,
            framing,
            loop_period,
            cycles: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Pause between cycles.
    pub fn loop_period(&self) -> Duration {
        self.loop_period
    }

    /// Counters so far.
    pub fn stats(&self) -> TransferLoopStats {
        TransferLoopStats {
            cycles: self.cycles.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Run one cycle.
    ///
    /// Outside this node's slot the cycle is skipped and counts as success.
    /// Otherwise M2S then S2M are attempted, the second even if the first
    /// failed.
    pub async fn run_once(&self) -> Result<CycleOutcome, TransferLoopError> {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if !self.framing.may_act_now() {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("[ima-03] Single loop skipped due to time framing");
            return Ok(CycleOutcome::Skipped);
        }

        let mut failed = Vec::new();
        for direction in TransferDirection::CYCLE {
            debug!(%direction, "[ima-03] Will invoke {} transfer", direction);
            match self.transfer.transfer(direction).await {
                Ok(()) => debug!(%direction, "[ima-03] {} transfer done", direction),
                Err(e) => {
                    warn!(%direction, error = %e, "[ima-03] {} transfer failed", direction);
                    failed.push(direction);
                }
            }
        }

        if failed.is_empty() {
            self.completed.fetch_add(1, Ordering::Relaxed);
            debug!("[ima-03] Single loop completed");
            Ok(CycleOutcome::Completed)
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            Err(TransferLoopError::TransferCycleFailed { failed })
        }
    }

    /// Repeat `run_once` until `shutdown` flips to `true` (or its sender is
    /// dropped). With `initial_delay` the first cycle waits one period.
    pub async fn run_forever(self: Arc<Self>, initial_delay: bool, mut shutdown: watch::Receiver<bool>) {
        info!(
            period_secs = self.loop_period.as_secs(),
            initial_delay,
            "[ima-03] Transfer loop started"
        );
        if initial_delay && !self.pause(&mut shutdown).await {
            info!("[ima-03] Transfer loop stopped");
            return;
        }
        loop {
            if *shutdown.borrow() {
                break;
            }
            if let Err(e) = self.run_once().await {
                warn!(error = %e, "[ima-03] Transfer cycle failed, loop continues");
            }
            if !self.pause(&mut shutdown).await {
                break;
            }
        }
        info!("[ima-03] Transfer loop stopped");
    }

    /// Sleep one period. Returns `false` if shutdown was requested meanwhile
    /// or the shutdown sender is gone.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.loop_period);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return false;
                    }
                }
            }
        }
    }
}
