//! # Domain Errors

use super::TransferDirection;
use thiserror::Error;

/// Failure reported by the transfer collaborator for one direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The relay attempt failed.
    #[error("{direction} transfer failed: {reason}")]
    Failed {
        /// Direction that failed
        direction: TransferDirection,
        /// Failure description
        reason: String,
    },
}

impl TransferError {
    /// Failure of `direction` for `reason`.
    pub fn failed(direction: TransferDirection, reason: impl Into<String>) -> Self {
        Self::Failed {
            direction,
            reason: reason.into(),
        }
    }
}

/// Outcome of an unsuccessful transfer cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferLoopError {
    /// At least one direction failed; both were attempted.
    #[error("transfer cycle failed for {}", format_directions(.failed))]
    TransferCycleFailed {
        /// Directions that failed, in cycle order
        failed: Vec<TransferDirection>,
    },
}

fn format_directions(directions: &[TransferDirection]) -> String {
    directions
        .iter()
        .map(TransferDirection::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
