//! # Transfer Loop
//!
//! Repeats the bidirectional relay cycle (main net to S-Chain, then S-Chain
//! to main net) at a fixed cadence, gated on this node's time slot.
//!
//! ## Architecture
//!
//! - **Domain Layer:** directions, error history, errors
//! - **Ports Layer:** `TransferPort`, the external relay collaborator
//! - **Service Layer:** `TransferLoop`

pub mod domain;
pub mod ports;
pub mod service;

/// Scripted transfer collaborator.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::{
    TransferDirection, TransferError, TransferErrorEntry, TransferErrorLog, TransferLoopError,
    DEFAULT_ERROR_LOG_CAPACITY,
};
pub use ports::TransferPort;
pub use service::{CycleOutcome, TransferLoop, TransferLoopStats, DEFAULT_LOOP_PERIOD};

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::ScriptedTransfer;
