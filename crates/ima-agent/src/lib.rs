//! # IMA Agent Library
//!
//! The pieces of the `ima-agent` binary, exposed for integration tests.
//!
//! - `config` - command-line / environment settings
//! - `runtime` - start-up sequence and task wiring
//! - `actions` - action runner and exit codes
//! - `sampler` - Prometheus sampling of roster and loop statistics
//! - `transfer` - the transfer collaborator shipped with the binary

pub mod actions;
pub mod config;
pub mod exit_codes;
pub mod runtime;
pub mod sampler;
pub mod transfer;

pub use actions::{run_actions, ActionKind, ActionSummary};
pub use config::{AgentConfig, ConfigError};
pub use runtime::{AgentError, AgentRuntime, RunningAgent};
pub use transfer::IdleTransfer;
