//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test doubles for desktop development
//! - `desktop`: Process-relative clock and log-backed display (requires `std` feature)
//!
//! Sensor, RFID and LCD drivers for a specific board live outside this crate
//! and only need to implement the traits.

pub mod mock;

#[cfg(feature = "std")]
pub mod desktop;

pub use mock::*;

#[cfg(feature = "std")]
pub use desktop::*;
