//! # Domain Layer
//!
//! Frame configuration and the pure slot arithmetic.

pub mod config;
pub mod frame;

pub use config::*;
pub use frame::*;
