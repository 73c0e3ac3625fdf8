//! Discovery quorum arithmetic.
//!
//! The quorum is derived per pass and never stored.

/// Quorum threshold for a roster of `total` nodes.
///
/// Without a positive override the threshold is `ceil(2 * total / 3)` for
/// rosters larger than two nodes and `total` otherwise. An override is
/// capped at `total`.
pub fn required_quorum(total: usize, min_quorum: Option<usize>) -> usize {
    match min_quorum {
        Some(min) if min > 0 => min.min(total),
        _ if total > 2 => (total * 2).div_ceil(3),
        _ => total,
    }
}

/// Quorum bookkeeping for one discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryQuorum {
    /// Nodes in the roster.
    pub total: usize,
    /// Nodes known to have failed so far.
    pub failed: usize,
    /// Nodes that must answer.
    pub required: usize,
}

impl DiscoveryQuorum {
    /// Start bookkeeping for a roster of `total` nodes.
    pub fn new(total: usize, min_quorum: Option<usize>) -> Self {
        Self {
            total,
            failed: 0,
            required: required_quorum(total, min_quorum),
        }
    }

    /// Nodes that could still answer.
    pub fn available(&self) -> usize {
        self.total.saturating_sub(self.failed)
    }

    /// Whether the quorum can still be met.
    pub fn is_reachable(&self) -> bool {
        self.available() >= self.required
    }

    /// Record a node failure.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_thirds_rule() {
        assert_eq!(required_quorum(3, None), 2);
        assert_eq!(required_quorum(4, None), 3);
        assert_eq!(required_quorum(5, None), 4);
        assert_eq!(required_quorum(6, None), 4);
        assert_eq!(required_quorum(16, None), 11);
    }

    #[test]
    fn test_small_rosters_require_everyone() {
        assert_eq!(required_quorum(0, None), 0);
        assert_eq!(required_quorum(1, None), 1);
        assert_eq!(required_quorum(2, None), 2);
    }

    #[test]
    fn test_ceil_matches_definition_for_all_sizes() {
        for n in 3..200usize {
            let expected = ((n as f64) * 2.0 / 3.0).ceil() as usize;
            assert_eq!(required_quorum(n, None), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_override_is_capped_at_total() {
        assert_eq!(required_quorum(4, Some(1)), 1);
        assert_eq!(required_quorum(4, Some(9)), 4);
        assert_eq!(required_quorum(4, Some(0)), 3);
    }

    #[test]
    fn test_availability_tracking() {
        let mut quorum = DiscoveryQuorum::new(4, None);
        assert!(quorum.is_reachable());
        quorum.record_failure();
        assert_eq!(quorum.available(), 3);
        assert!(quorum.is_reachable());
        quorum.record_failure();
        assert!(!quorum.is_reachable());
    }
}
