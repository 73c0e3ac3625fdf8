//! # Adapters
//!
//! Concrete transports for the outbound RPC port.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpRpcChannel, HttpSChainRpc};
