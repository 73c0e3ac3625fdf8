//! # Domain Layer

pub mod direction;
pub mod error_log;
pub mod errors;

pub use direction::*;
pub use error_log::*;
pub use errors::*;
