//! # Driving Ports (Inbound API)

use crate::domain::Roster;
use std::sync::Arc;

/// Read-only access to the last fully assembled roster.
///
/// Readers never see a half-built snapshot: a new roster is assembled on the
/// side and swapped in whole.
pub trait RosterView: Send + Sync {
    /// Current snapshot, or `None` before the first successful discovery.
    fn snapshot(&self) -> Option<Arc<Roster>>;

    /// `(discovered, total)` of the current snapshot.
    fn counts(&self) -> (usize, usize) {
        self.snapshot()
            .map(|roster| (roster.discovered_count(), roster.total()))
            .unwrap_or((0, 0))
    }
}
