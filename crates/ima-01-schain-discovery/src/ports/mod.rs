//! # Ports Layer
//!
//! - `inbound`: what this subsystem offers to the rest of the agent
//! - `outbound`: what the host must provide (the RPC transport)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
