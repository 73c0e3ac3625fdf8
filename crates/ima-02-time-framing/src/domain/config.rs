//! Frame configuration.

use thiserror::Error;

/// Default safety gap at the end of each frame.
pub const DEFAULT_FRAME_GAP_SECS: u64 = 10;

/// Invalid frame configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameConfigError {
    /// The node index does not fit the node count.
    #[error("node index {node_index} is out of range for {node_count} node(s)")]
    NodeIndexOutOfRange {
        /// Configured node index
        node_index: u64,
        /// Configured node count
        node_count: u64,
    },

    /// The gap swallows the whole frame, so the node could never act.
    #[error("frame gap of {gap_secs}s leaves nothing of a {frame_length_secs}s frame")]
    GapExceedsFrame {
        /// Configured frame length
        frame_length_secs: u64,
        /// Configured gap
        gap_secs: u64,
    },

    /// One rotation over all nodes does not fit in a timestamp.
    #[error("{node_count} frame(s) of {frame_length_secs}s overflow the clock range")]
    RotationTooLong {
        /// Configured frame length
        frame_length_secs: u64,
        /// Configured node count
        node_count: u64,
    },
}

/// Static time-framing parameters of this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// This node's 0-based index.
    pub node_index: u64,
    /// Number of nodes sharing the schedule.
    pub node_count: u64,
    /// Frame length in seconds. Zero disables framing.
    pub frame_length_secs: u64,
    /// Trailing part of each frame in which the owner must not start work.
    pub gap_secs: u64,
}

impl Default for FrameConfig {
    /// Framing disabled.
    fn default() -> Self {
        Self {
            node_index: 0,
            node_count: 1,
            frame_length_secs: 0,
            gap_secs: DEFAULT_FRAME_GAP_SECS,
        }
    }
}

impl FrameConfig {
    /// Configuration for `node_index` of `node_count` nodes.
    pub fn new(node_index: u64, node_count: u64, frame_length_secs: u64, gap_secs: u64) -> Self {
        Self {
            node_index,
            node_count,
            frame_length_secs,
            gap_secs,
        }
    }

    /// Framing applies only with a positive frame length and more than one node.
    pub fn is_enabled(&self) -> bool {
        self.frame_length_secs > 0 && self.node_count > 1
    }

    /// Length of one full rotation over all nodes.
    pub fn total_range_secs(&self) -> u64 {
        self.frame_length_secs.saturating_mul(self.node_count)
    }

    /// Check the invariants that matter while framing is enabled.
    pub fn validate(&self) -> Result<(), FrameConfigError> {
        if !self.is_enabled() {
            return Ok(());
        }
        if self.node_index >= self.node_count {
            return Err(FrameConfigError::NodeIndexOutOfRange {
                node_index: self.node_index,
                node_count: self.node_count,
            });
        }
        let rotation_fits = self
            .frame_length_secs
            .checked_mul(self.node_count)
            .is_some_and(|total| i64::try_from(total).is_ok());
        if !rotation_fits {
            return Err(FrameConfigError::RotationTooLong {
                frame_length_secs: self.frame_length_secs,
                node_count: self.node_count,
            });
        }
        if self.gap_secs >= self.frame_length_secs {
            return Err(FrameConfigError::GapExceedsFrame {
                frame_length_secs: self.frame_length_secs,
                gap_secs: self.gap_secs,
            });
        }
        Ok(())
    }
}
