//! Start-up readiness probe.

use super::DiscoveryService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause between readiness attempts.
pub const DEFAULT_STARTUP_BACKOFF: Duration = Duration::from_secs(1);

/// Result of waiting for the S-Chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// A discovery pass succeeded on the given attempt.
    Ready {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// The attempt budget ran out.
    Exhausted {
        /// Attempts made
        attempts: u32,
    },
}

impl ReadinessOutcome {
    /// Whether the S-Chain answered.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Blocks until a silent discovery pass succeeds.
///
/// The probe result is discarded; nothing is installed into the roster store.
pub struct StartupGate {
    discovery: Arc<DiscoveryService>,
    backoff: Duration,
}

impl StartupGate {
    /// Gate with the default one-second backoff.
    pub fn new(discovery: Arc<DiscoveryService>) -> Self {
        Self {
            discovery,
            backoff: DEFAULT_STARTUP_BACKOFF,
        }
    }

    /// Override the pause between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Probe until ready, or until `max_attempts` probes failed.
    /// `None` waits indefinitely. At least one attempt is always made.
    pub async fn await_ready(&self, max_attempts: Option<u32>) -> ReadinessOutcome {
        info!("[ima-01] Waiting for S-Chain to start");
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.discovery.discover(None, None, true).await {
                Ok(roster) => {
                    info!(
                        attempts,
                        discovered = roster.discovered_count(),
                        total = roster.total(),
                        "[ima-01] S-Chain is started"
                    );
                    return ReadinessOutcome::Ready { attempts };
                }
                Err(e) => debug!(attempts, error = %e, "[ima-01] S-Chain is not ready yet"),
            }
            if max_attempts.is_some_and(|max| attempts >= max.max(1)) {
                warn!(attempts, "[ima-01] Gave up waiting for S-Chain to start");
                return ReadinessOutcome::Exhausted { attempts };
            }
            tokio::time::sleep(self.backoff).await;
        }
    }
}
