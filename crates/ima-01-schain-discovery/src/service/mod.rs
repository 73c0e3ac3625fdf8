//! # Service Layer
//!
//! - `discovery`: one quorum-tolerant discovery pass, plus the strict browse
//! - `roster_store`: the atomically swapped roster snapshot
//! - `rediscovery`: background refresh until the roster is complete
//! - `startup_gate`: readiness probe run before the agent starts working

/// Log at `info`, or at `debug` when the caller asked for a silent pass.
macro_rules! progress {
    ($silent:expr, $($arg:tt)+) => {
        if $silent {
            tracing::debug!($($arg)+);
        } else {
            tracing::info!($($arg)+);
        }
    };
}

pub mod discovery;
pub mod rediscovery;
pub mod roster_store;
pub mod startup_gate;


pub use discovery::DiscoveryService;
pub use rediscovery::{RediscoveryScheduler, RediscoveryStats, SchedulerState};
pub use roster_store::RosterStore;
pub use startup_gate::{ReadinessOutcome, StartupGate, DEFAULT_STARTUP_BACKOFF};
