//! # Time Framing
//!
//! Partitions wall-clock time into per-node ownership windows so that only
//! one agent of a multi-node S-Chain starts transfers at any moment. No
//! coordination messages are exchanged; every node evaluates the same
//! arithmetic against its own clock.
//!
//! ```rust
//! use ima_02_time_framing::{may_act_at, FrameConfig};
//!
//! // node 1 of 3, one-minute frames, ten-second gap
//! let config = FrameConfig::new(1, 3, 60, 10);
//! assert!(may_act_at(180 * 100 + 60, &config));
//! assert!(!may_act_at(180 * 100 + 110, &config));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Settable clock for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::SystemTimeSource;
pub use domain::{
    evaluate, may_act_at, FrameConfig, FrameConfigError, FrameDecision, DEFAULT_FRAME_GAP_SECS,
};
pub use ports::TimeSource;
pub use service::TimeFrameScheduler;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::FixedTimeSource;
