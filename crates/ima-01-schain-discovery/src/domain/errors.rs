//! # Domain Errors
//!
//! Failure classes of a discovery pass. Per-node failures are absorbed by the
//! quorum logic and never surface here unless the quorum is breached; the
//! `Node*` variants are only produced by the strict `browse` operation.

use thiserror::Error;

/// Errors that end a discovery (or browse) pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The seed endpoint could not be reached or refused the `listNodes` call.
    #[error("JSON RPC call to S-Chain {endpoint} failed: {reason}")]
    SeedUnreachable {
        /// Seed endpoint URL
        endpoint: String,
        /// Transport or RPC failure description
        reason: String,
    },

    /// The seed answered but carried no network description.
    #[error("got wrong response, network information description was not detected")]
    EmptyRoster,

    /// Too many nodes failed before the wait phase for the quorum to be met.
    #[error(
        "not enough nodes available on S-Chain, total {total}, available {available}, expected at least {required}"
    )]
    QuorumUnreachable {
        /// Nodes in the roster
        total: usize,
        /// Nodes not yet known to have failed
        available: usize,
        /// Quorum threshold
        required: usize,
    },

    /// The wait phase ran out of attempts and no node was discovered.
    #[error(
        "S-Chain network discovery wait timeout, {answered} of {required} expected answer(s) from {total} node(s)"
    )]
    Timeout {
        /// Nodes in the roster
        total: usize,
        /// Quorum threshold
        required: usize,
        /// Capability records received before the budget ran out
        answered: usize,
    },

    /// Browse only: a node's endpoint could not be reached.
    #[error("JSON RPC call to S-Chain node #{index} ({endpoint}) failed: {reason}")]
    NodeUnreachable {
        /// Roster index of the node
        index: usize,
        /// Endpoint that was tried (empty if none could be composed)
        endpoint: String,
        /// Failure description
        reason: String,
    },

    /// Browse only: a node answered the capability query with an error.
    #[error("S-Chain node #{index} ({endpoint}) capability query failed: {reason}")]
    NodeQueryFailed {
        /// Roster index of the node
        index: usize,
        /// Node endpoint
        endpoint: String,
        /// Failure description
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_unreachable_reports_counts() {
        let err = DiscoveryError::QuorumUnreachable {
            total: 4,
            available: 2,
            required: 3,
        };
        let text = err.to_string();
        assert!(text.contains("total 4"));
        assert!(text.contains("available 2"));
        assert!(text.contains("at least 3"));
    }

    #[test]
    fn test_seed_unreachable_names_endpoint() {
        let err = DiscoveryError::SeedUnreachable {
            endpoint: "http://127.0.0.1:2231".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("127.0.0.1:2231"));
    }
}
