//! Desktop implementations for the bench setup.
//!
//! The clock counts from process start; the display writes each page to the
//! log instead of an LCD.

use std::time::Instant;

use crate::traits::{Clock, StatusDisplay};

/// Monotonic clock measuring milliseconds since it was created.
///
/// # Example
///
/// ```rust
/// use slide_timer::hal::SystemClock;
/// use slide_timer::traits::Clock;
///
/// let clock = SystemClock::new();
/// assert!(clock.now_ms() < 1_000);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Display that logs each page at `info` level.
#[derive(Clone, Debug, Default)]
pub struct ConsoleDisplay {
    prefix: Option<String>,
}

impl ConsoleDisplay {
    /// Creates a console display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every logged page with `prefix` (e.g. the device name).
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl StatusDisplay for ConsoleDisplay {
    type Error = core::convert::Infallible;

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        match &self.prefix {
            Some(prefix) => log::info!("[{}] | {:<16} | {:<16} |", prefix, line1, line2),
            None => log::info!("| {:<16} | {:<16} |", line1, line2),
        }
        Ok(())
    }
}
