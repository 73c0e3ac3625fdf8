//! Holder of the last fully assembled roster.

use crate::domain::Roster;
use crate::ports::RosterView;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared roster snapshot.
///
/// Writers build a complete `Roster` and swap it in; readers clone the `Arc`
/// and keep a consistent view for as long as they hold it.
#[derive(Debug, Default)]
pub struct RosterStore {
    current: RwLock<Option<Arc<Roster>>>,
}

impl RosterStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot and return the installed one.
    pub fn install(&self, roster: Roster) -> Arc<Roster> {
        let roster = Arc::new(roster);
        *self.current.write() = Some(Arc::clone(&roster));
        tracing::debug!(
            discovered = roster.discovered_count(),
            total = roster.total(),
            "[ima-01] Roster snapshot installed"
        );
        roster
    }
}

impl RosterView for RosterStore {
    fn snapshot(&self) -> Option<Arc<Roster>> {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeDescriptor;
    use serde_json::json;

    #[test]
    fn test_empty_store() {
        let store = RosterStore::new();
        assert!(store.snapshot().is_none());
        assert_eq!(store.counts(), (0, 0));
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_installs() {
        let store = RosterStore::new();
        store.install(Roster::new(vec![NodeDescriptor::with_url(0, "http://a")]));
        let held = store.snapshot().unwrap();

        let mut node = NodeDescriptor::with_url(0, "http://a");
        node.ima_info = Some(json!({"t": 1}));
        store.install(Roster::new(vec![node, NodeDescriptor::with_url(1, "http://b")]));

        assert_eq!(held.total(), 1);
        assert_eq!(held.discovered_count(), 0);
        assert_eq!(store.counts(), (1, 2));
    }
}
