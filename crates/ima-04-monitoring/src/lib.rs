//! # Monitoring Endpoint
//!
//! Read-only request/answer socket for operators. Each message names a
//! `method`; the answer echoes `method` and `id`, carries `error` (or
//! `null`) and the method's payload.
//!
//! | method | payload field |
//! |--------|---------------|
//! | `echo`, `ping` | none |
//! | `get_schain_network_info` | `schain_network_info` |
//! | `get_runtime_params` | `runtime_params` |
//! | `get_last_transfer_errors` | `last_transfer_errors` |
//!
//! ## Architecture
//!
//! - **Domain Layer:** method table and errors
//! - **Service Layer:** `MonitoringState`, the dispatcher
//! - **Adapters Layer:** axum WebSocket listener and `/metrics` (feature `ws`)

pub mod adapters;
pub mod domain;
pub mod service;

pub use domain::{MonitoringError, MonitoringMethod};
pub use service::MonitoringState;

#[cfg(feature = "ws")]
pub use adapters::{build_router, MonitoringConnection, MonitoringServer};
