//! # Driven Ports (Outbound SPI)
//!
//! The JSON-RPC transport used to talk to the seed and to every node.
//! Opening a channel and issuing a call are separate steps: a node whose
//! channel cannot be opened is counted as failed before any query is sent.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors from the RPC transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The endpoint could not be reached or the channel could not be opened.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote side answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Remote {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// The answer was not a valid JSON-RPC response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Whether the failure happened below the RPC layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Factory for RPC channels.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct LoopbackRpc;
///
/// #[async_trait]
/// impl SChainRpc for LoopbackRpc {
///     async fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcChannel>, RpcError> {
///         Ok(Arc::new(LoopbackChannel::new(endpoint)))
///     }
/// }
/// ```
#[async_trait]
pub trait SChainRpc: Send + Sync {
    /// Open a channel to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcChannel>, RpcError>;
}

/// An open JSON-RPC channel to one endpoint.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Invoke `method` and return the response's `result` member.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}
