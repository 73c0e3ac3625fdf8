//! # Ports
//!
//! The only outbound dependency is the wall clock.

/// Abstract clock.
///
/// Production code uses [`crate::SystemTimeSource`]; tests pin the clock.
pub trait TimeSource: Send + Sync {
    /// Current Unix UTC time in whole seconds.
    fn unix_seconds(&self) -> i64;
}
