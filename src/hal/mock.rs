//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for every collaborator trait, so the
//! tracker and startup sequence can be exercised on a desktop.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockClock`] | [`Clock`] | Controllable monotonic time |
//! | [`MockDisplay`] | [`StatusDisplay`] | Records every page shown |
//! | [`MockReporter`] | [`RunReporter`] | Captures reported runs, can fail |
//! | [`MockTimeSource`] | [`TimeSource`] | Canned UTC reading or failure |
//!
//! # Example
//!
//! ```rust
//! use slide_timer::hal::{MockDisplay, MockReporter};
//! use slide_timer::{RunTracker, TrackerSettings, SensorId};
//! use slide_timer::clock::Timestamp;
//! use slide_timer::config::SensorConfig;
//!
//! let mut tracker = RunTracker::new(
//!     MockDisplay::new(),
//!     MockReporter::new(),
//!     SensorConfig::default(),
//!     TrackerSettings::default(),
//! );
//!
//! // A lower trip with nothing started is dropped
//! tracker.on_object_detected(SensorId::Lower, Timestamp::from_millis(5));
//! assert!(tracker.display().pages.is_empty());
//! assert!(tracker.reporter().reports.is_empty());
//! ```
//!
//! [`Clock`]: crate::traits::Clock
//! [`StatusDisplay`]: crate::traits::StatusDisplay
//! [`RunReporter`]: crate::traits::RunReporter
//! [`TimeSource`]: crate::traits::TimeSource

use alloc::string::String;
use alloc::vec::Vec;

use crate::run::CompletedRun;
use crate::traits::{Clock, RunReporter, StatusDisplay, TimeSource};

// ============================================================================
// Clock
// ============================================================================

/// Mock clock for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use slide_timer::hal::MockClock;
/// use slide_timer::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms = self.current_ms.saturating_add(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Display
// ============================================================================

/// Mock two-line display.
///
/// Every successful `show` appends a page. With [`failing`](Self::failing)
/// every call errors and nothing is recorded.
///
/// # Example
///
/// ```rust
/// use slide_timer::hal::MockDisplay;
/// use slide_timer::traits::StatusDisplay;
///
/// let mut display = MockDisplay::new();
/// display.show("Ready", "").unwrap();
/// assert_eq!(display.last_page(), Some(("Ready", "")));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockDisplay {
    /// Pages shown so far, oldest first.
    pub pages: Vec<(String, String)>,
    /// Number of show calls, including failed ones.
    pub show_count: usize,
    /// Whether every call should fail.
    pub fail: bool,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }

    /// A display whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The most recent page.
    pub fn last_page(&self) -> Option<(&str, &str)> {
        self.pages.last().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// All pages as string slices, for comparisons.
    pub fn pages_as_str(&self) -> Vec<(&str, &str)> {
        self.pages
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect()
    }

    /// First lines of all pages.
    pub fn headlines(&self) -> Vec<&str> {
        self.pages.iter().map(|(a, _)| a.as_str()).collect()
    }
}

impl StatusDisplay for MockDisplay {
    type Error = &'static str;

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        self.show_count += 1;
        if self.fail {
            return Err("display offline");
        }
        self.pages.push((line1.into(), line2.into()));
        Ok(())
    }
}

// ============================================================================
// Network
// ============================================================================

/// Mock run reporter.
///
/// # Example
///
/// ```rust
/// use slide_timer::hal::MockReporter;
/// use slide_timer::run::CompletedRun;
/// use slide_timer::clock::Timestamp;
/// use slide_timer::traits::RunReporter;
///
/// let run = CompletedRun { rider_id: None, started_at: Timestamp::default(), elapsed_ms: 10 };
///
/// let mut ok = MockReporter::new();
/// ok.report(&run).unwrap();
/// assert_eq!(ok.reports, vec![run]);
///
/// let mut broken = MockReporter::failing();
/// assert!(broken.report(&run).is_err());
/// assert_eq!(broken.attempts, 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockReporter {
    /// Runs reported successfully.
    pub reports: Vec<CompletedRun>,
    /// Number of report calls, including failed ones.
    pub attempts: usize,
    /// Whether every call should fail.
    pub fail: bool,
}

impl MockReporter {
    /// Creates a reporter that accepts every run.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl RunReporter for MockReporter {
    type Error = &'static str;

    fn report(&mut self, run: &CompletedRun) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.fail {
            return Err("connection refused");
        }
        self.reports.push(*run);
        Ok(())
    }
}

/// Mock time source with a canned answer.
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    /// What `fetch_utc_ms` returns.
    pub reading: Result<i64, &'static str>,
    /// Number of fetches.
    pub calls: usize,
}

impl MockTimeSource {
    /// A source that always reports `utc_ms`.
    pub fn at(utc_ms: i64) -> Self {
        Self {
            reading: Ok(utc_ms),
            calls: 0,
        }
    }

    /// A source that always fails.
    pub fn failing() -> Self {
        Self {
            reading: Err("no response from time server"),
            calls: 0,
        }
    }
}

impl TimeSource for MockTimeSource {
    type Error = &'static str;

    fn fetch_utc_ms(&mut self) -> Result<i64, Self::Error> {
        self.calls += 1;
        self.reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_display_records_nothing() {
        let mut display = MockDisplay::failing();
        assert!(display.show("a", "b").is_err());
        assert!(display.pages.is_empty());
        assert_eq!(display.show_count, 1);
    }

    #[test]
    fn time_source_counts_calls() {
        let mut source = MockTimeSource::at(42);
        assert_eq!(source.fetch_utc_ms(), Ok(42));
        assert_eq!(source.fetch_utc_ms(), Ok(42));
        assert_eq!(source.calls, 2);
        assert!(MockTimeSource::failing().fetch_utc_ms().is_err());
    }

    #[test]
    fn clock_advance_saturates() {
        let mut clock = MockClock::new();
        clock.set(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now_ms(), u64::MAX);
    }
}
