//! # S-Chain Network Discovery
//!
//! Maps an S-Chain seed endpoint to a live node roster, tolerating a minority
//! of unavailable nodes, and keeps that roster fresh in the background.
//!
//! ## Architecture
//!
//! - **Domain Layer:** node descriptors, roster, quorum arithmetic, errors
//! - **Ports Layer:** the JSON-RPC transport (`SChainRpc`) and `RosterView`
//! - **Service Layer:** discovery pass, roster store, rediscovery, start-up gate
//! - **Adapters Layer:** JSON-RPC over HTTP (feature `http`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use ima_01_schain_discovery::{DiscoveryConfig, DiscoveryService, HttpSChainRpc, RosterStore};
//!
//! let rpc = Arc::new(HttpSChainRpc::new(DEFAULT_REQUEST_TIMEOUT)?);
//! let service = DiscoveryService::new(rpc, DiscoveryConfig::new("http://127.0.0.1:2231", 0));
//! let roster = service.discover(None, None, false).await?;
//! println!("{}", roster.discovery_summary());
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// FEATURE-GATED MODULES
// =============================================================================

/// Concrete RPC transports.
/// Requires feature: `http`
pub mod adapters;

/// Scriptable in-memory S-Chain.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use domain::{
    required_quorum, DiscoveryConfig, DiscoveryError, DiscoveryQuorum, NodeDescriptor, Roster,
    DEFAULT_POLL_INTERVAL, DEFAULT_REPEAT_INTERVAL, DEFAULT_WAIT_SAFETY_MARGIN,
    DISCOVERY_MARKER_FIELD, FROM_NODE_INDEX_PARAM, LIST_NODES_METHOD, NODE_CAPABILITIES_METHOD,
};

pub use ports::{RosterView, RpcChannel, RpcError, SChainRpc};

pub use service::{
    DiscoveryService, ReadinessOutcome, RediscoveryScheduler, RediscoveryStats, RosterStore,
    SchedulerState, StartupGate, DEFAULT_STARTUP_BACKOFF,
};

#[cfg(feature = "http")]
pub use adapters::{HttpRpcChannel, HttpSChainRpc};

#[cfg(feature = "http")]
pub use adapters::http::DEFAULT_REQUEST_TIMEOUT;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{EndpointBehavior, MockSChainRpc};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
