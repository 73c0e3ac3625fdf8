//! # Domain Layer
//!
//! Request methods, answer shape and errors of the monitoring socket.

pub mod errors;
pub mod method;

pub use errors::MonitoringError;
pub use method::MonitoringMethod;
