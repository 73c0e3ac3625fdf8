//! Test utilities.

use crate::ports::TimeSource;
use std::sync::atomic::{AtomicI64, Ordering};

/// Settable clock.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    now: AtomicI64,
}

impl FixedTimeSource {
    /// Clock pinned at `unix_secs`.
    pub fn new(unix_secs: i64) -> Self {
        Self {
            now: AtomicI64::new(unix_secs),
        }
    }

    /// Move the clock to `unix_secs`.
    pub fn set(&self, unix_secs: i64) {
        self.now.store(unix_secs, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn unix_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
