//! Bounded history of recent transfer failures.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Entries kept by default.
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 20;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferErrorEntry {
    /// Unix UTC seconds.
    pub timestamp: i64,
    /// Failure description.
    pub message: String,
}

/// Ring of the most recent failures; the oldest entry is evicted first.
#[derive(Debug)]
pub struct TransferErrorLog {
    capacity: usize,
    entries: Mutex<VecDeque<TransferErrorEntry>>,
}

impl Default for TransferErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LOG_CAPACITY)
    }
}

impl TransferErrorLog {
    /// Log holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Record a failure stamped with the current time.
    pub fn record(&self, message: impl Into<String>) {
        self.record_at(chrono::Utc::now().timestamp(), message);
    }

    /// Record a failure with an explicit timestamp.
    pub fn record_at(&self, timestamp: i64, message: impl Into<String>) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(TransferErrorEntry {
            timestamp,
            message: message.into(),
        });
    }

    /// Entries, oldest first.
    pub fn snapshot(&self) -> Vec<TransferErrorEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of stored entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
