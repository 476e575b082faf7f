//! Nullable infrastructure for deterministic testing.
//!
//! Token operations take the current time as an argument, read by callers
//! from a [`levy_types::Clock`]. This crate provides a clock that never
//! touches the system time and only moves when told to.

pub mod clock;

pub use clock::NullClock;
