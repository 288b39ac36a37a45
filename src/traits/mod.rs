//! Trait definitions for the slide timer's external collaborators.
//!
//! These abstractions let the run tracker work the same way against real
//! hardware, the desktop bench setup, and the mocks used in tests.
//!
//! # Submodules
//!
//! - `hardware`: Sensor identity and the monotonic clock
//! - `display`: Two-line status display
//! - `network`: Run reporting and time sync
//!
//! # Collaborators
//!
//! - [`StatusDisplay`]: "show two lines of text"
//! - [`RunReporter`]: deliver a completed run
//! - [`TimeSource`]: current UTC time for clock sync
//! - [`Clock`]: monotonic milliseconds

pub mod display;
pub mod hardware;
pub mod network;

pub use display::*;
pub use hardware::*;
pub use network::*;
