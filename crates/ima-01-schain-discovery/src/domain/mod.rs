//! # Domain Layer
//!
//! Pure discovery types and rules. Nothing here performs I/O.

pub mod config;
pub mod entities;
pub mod errors;
pub mod quorum;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use quorum::*;
