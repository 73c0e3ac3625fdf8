//! Discovery configuration.

use std::time::Duration;

/// JSON-RPC method asking the seed for the node list.
pub const LIST_NODES_METHOD: &str = "listNodes";

/// JSON-RPC method asking a node for its capability descriptor.
pub const NODE_CAPABILITIES_METHOD: &str = "nodeCapabilities";

/// Parameter carrying this agent's node index in every discovery call.
pub const FROM_NODE_INDEX_PARAM: &str = "fromNodeIndex";

/// Default rediscovery interval (10 seconds).
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Default wait-phase poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Attempts subtracted from the wait budget so one pass ends before the next
/// rediscovery tick.
pub const DEFAULT_WAIT_SAFETY_MARGIN: u32 = 3;

/// Static configuration of the discovery protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// URL of the S-Chain endpoint asked for the node list.
    pub seed_endpoint: String,
    /// This agent's node index, sent with every call.
    pub node_index: u64,
    /// Rediscovery interval. Zero disables periodic rediscovery.
    pub repeat_interval: Duration,
    /// Wait-phase poll interval.
    pub poll_interval: Duration,
    /// Attempts kept in reserve below one rediscovery cycle.
    pub wait_safety_margin: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            seed_endpoint: String::new(),
            node_index: 0,
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_safety_margin: DEFAULT_WAIT_SAFETY_MARGIN,
        }
    }
}

impl DiscoveryConfig {
    /// Create a configuration for the given seed and node index.
    pub fn new(seed_endpoint: impl Into<String>, node_index: u64) -> Self {
        Self {
            seed_endpoint: seed_endpoint.into(),
            node_index,
            ..Self::default()
        }
    }

    /// Number of wait-phase polls a pass may spend: one rediscovery interval
    /// worth of polls minus the safety margin, never less than one.
    pub fn wait_attempts(&self) -> u32 {
        let poll_ms = self.poll_interval.as_millis().max(1);
        let polls = self.repeat_interval.as_millis() / poll_ms;
        let polls = u32::try_from(polls).unwrap_or(u32::MAX);
        polls.saturating_sub(self.wait_safety_margin).max(1)
    }

    /// Whether periodic rediscovery is enabled.
    pub fn rediscovery_enabled(&self) -> bool {
        !self.repeat_interval.is_zero()
    }
}
