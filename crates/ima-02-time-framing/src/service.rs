//! # Time Frame Scheduler
//!
//! Binds a validated [`FrameConfig`] to a clock and answers "may this node
//! act now?". Each decision's full table is logged at trace level.

use crate::domain::{evaluate, FrameConfig, FrameConfigError, FrameDecision};
use crate::ports::TimeSource;
use std::sync::Arc;
use tracing::trace;

/// Per-process slot predicate.
pub struct TimeFrameScheduler {
    config: FrameConfig,
    clock: Arc<dyn TimeSource>,
}

impl TimeFrameScheduler {
    /// Scheduler over `clock`. Fails if the configuration is inconsistent.
    pub fn new(config: FrameConfig, clock: Arc<dyn TimeSource>) -> Result<Self, FrameConfigError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    /// Frame configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Full decision for the current instant.
    pub fn decision_now(&self) -> FrameDecision {
        let decision = evaluate(self.clock.unix_seconds(), &self.config);
        if decision.enabled {
            trace!(
                unix_secs = decision.unix_secs,
                active_frame_index = decision.active_frame_index,
                node_index = decision.node_index,
                skip = decision.skip,
                inside_gap = decision.inside_gap,
                "[ima-02] Time framing decision\n{}",
                decision
            );
        }
        decision
    }

    /// Whether this node owns the transfer slot right now.
    pub fn may_act_now(&self) -> bool {
        self.decision_now().permitted()
    }
}
