//! # Adapters Layer
//!
//! axum WebSocket listener for the dispatcher plus the Prometheus scrape
//! route.

#[cfg(feature = "ws")]
pub mod server;
#[cfg(feature = "ws")]
pub mod ws;

#[cfg(feature = "ws")]
pub use server::{build_router, MonitoringServer};
#[cfg(feature = "ws")]
pub use ws::MonitoringConnection;
