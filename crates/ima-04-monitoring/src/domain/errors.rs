//! Monitoring errors.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors of the monitoring endpoint.
///
/// The first two never reach the caller of the listener: they become the
/// `error` field of an answer and the connection carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitoringError {
    /// Not JSON, not an object, or a required field is missing.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The `method` is not in the dispatch table.
    #[error("unknown method name \"{0}\" was specified")]
    UnknownMethod(String),

    /// The listener could not be bound.
    #[error("failed to bind monitoring listener on {addr}: {reason}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// OS error text
        reason: String,
    },

    /// The listener stopped with an I/O error.
    #[error("monitoring listener failed: {0}")]
    Serve(String),
}
