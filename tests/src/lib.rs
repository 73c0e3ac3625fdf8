//! # IMA Test Suite
//!
//! Cross-crate scenarios driving the agent against a scripted in-memory
//! S-Chain.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── discovery_flow.rs
//!     ├── startup_flow.rs
//!     ├── time_framed_loop.rs
//!     └── monitoring_socket.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ima-tests
//! cargo test -p ima-tests integration::monitoring_socket::
//! ```

pub mod integration;
