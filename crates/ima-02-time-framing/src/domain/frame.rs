//! Frame arithmetic.
//!
//! Wall-clock time is cut into rotations of `frame_length * node_count`
//! seconds. Inside each rotation node `i` owns `[i * frame, (i + 1) * frame)`
//! minus the trailing gap. Every node derives the same partition from the
//! shared clock alone.

use super::FrameConfig;
use std::fmt;

/// Every intermediate value of one framing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDecision {
    /// Unix UTC seconds the decision was made for.
    pub unix_secs: i64,
    /// Whether framing was enabled at all.
    pub enabled: bool,
    /// Rotation length in seconds.
    pub total_range: i64,
    /// Position inside the current rotation.
    pub range_mod: i64,
    /// Index of the node owning the current frame.
    pub active_frame_index: i64,
    /// Index this decision was made for.
    pub node_index: i64,
    /// Start of the current rotation.
    pub range_start: i64,
    /// Start of this node's frame in the current rotation.
    pub frame_start: i64,
    /// Start of the trailing gap of this node's frame.
    pub gap_start: i64,
    /// Inside this node's own frame but past its gap start.
    pub inside_gap: bool,
    /// Whether this node must not act.
    pub skip: bool,
}

impl FrameDecision {
    /// Whether this node may start a transfer cycle.
    pub fn permitted(&self) -> bool {
        !self.skip
    }
}

impl fmt::Display for FrameDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return write!(f, "time framing disabled at {}", self.unix_secs);
        }
        writeln!(f, "Unix UTC time stamp........{}", self.unix_secs)?;
        writeln!(f, "All Chains Range...........{}", self.total_range)?;
        writeln!(f, "S-Chain Range Mod..........{}", self.range_mod)?;
        writeln!(f, "Active Node Frame Index....{}", self.active_frame_index)?;
        writeln!(f, "Testing Frame Index........{}", self.node_index)?;
        writeln!(f, "Is skip....................{}", yes_no(self.skip))?;
        writeln!(f, "Is inside gap..............{}", yes_no(self.inside_gap))?;
        writeln!(f, "Range Start................{}", self.range_start)?;
        writeln!(f, "Frame Start................{}", self.frame_start)?;
        write!(f, "Gap Start..................{}", self.gap_start)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Evaluate the frame schedule at `unix_secs`.
///
/// Arithmetic saturates, so configurations that fail
/// [`FrameConfig::validate`] still produce a decision instead of
/// overflowing.
pub fn evaluate(unix_secs: i64, config: &FrameConfig) -> FrameDecision {
    let node_index = to_i64(config.node_index);
    if !config.is_enabled() {
        return FrameDecision {
            unix_secs,
            enabled: false,
            total_range: 0,
            range_mod: 0,
            active_frame_index: node_index,
            node_index,
            range_start: unix_secs,
            frame_start: unix_secs,
            gap_start: unix_secs,
            inside_gap: false,
            skip: false,
        };
    }

    let frame = to_i64(config.frame_length_secs);
    let gap = to_i64(config.gap_secs);
    let total_range = to_i64(config.total_range_secs());
    let range_mod = unix_secs.rem_euclid(total_range);
    let active_frame_index = range_mod / frame;
    let range_start = unix_secs.saturating_sub(range_mod);
    let frame_start = range_start.saturating_add(node_index.saturating_mul(frame));
    let gap_start = frame_start.saturating_add(frame).saturating_sub(gap);

    let not_our_turn = active_frame_index != node_index;
    let inside_gap = !not_our_turn && unix_secs >= gap_start;

    FrameDecision {
        unix_secs,
        enabled: true,
        total_range,
        range_mod,
        active_frame_index,
        node_index,
        range_start,
        frame_start,
        gap_start,
        inside_gap,
        skip: not_our_turn || inside_gap,
    }
}

/// Whether the node described by `config` may act at `unix_secs`.
pub fn may_act_at(unix_secs: i64, config: &FrameConfig) -> bool {
    evaluate(unix_secs, config).permitted()
}
