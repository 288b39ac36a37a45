//! Network-facing collaborator traits: run reporting and time sync.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RunReporter`] | Deliver a completed run to the remote service |
//! | [`TimeSource`] | Fetch current UTC time at startup |
//!
//! # Report Delivery
//!
//! The reporter is called from inside the event loop, so implementations
//! must not block on the network. The HTTP reporter in
//! `services::http_reporter` spawns the POST and returns immediately:
//!
//! ```text
//! POST /slideruns
//! Content-Type: application/json
//! Accept: text/plain
//!
//! {"keyfobNum":"12345","startTimeStamp":"...","endTimeStamp":"..."}
//! ```

use crate::run::CompletedRun;

/// Delivers completed runs to the remote service.
///
/// # Implementation Notes
///
/// - Must return promptly; dispatch network I/O asynchronously
/// - Errors are logged by the tracker and never prevent the run reset
///
/// # Example
///
/// ```rust
/// use slide_timer::traits::RunReporter;
/// use slide_timer::run::CompletedRun;
/// use slide_timer::SlideRunReport;
///
/// struct Printer;
///
/// impl RunReporter for Printer {
///     type Error = core::convert::Infallible;
///
///     fn report(&mut self, run: &CompletedRun) -> Result<(), Self::Error> {
///         let body = SlideRunReport::from(run).to_json();
///         println!("{}", body);
///         Ok(())
///     }
/// }
/// ```
pub trait RunReporter {
    /// Error type for reporting failures.
    type Error: core::fmt::Display;

    /// Hand a completed run to the transport.
    fn report(&mut self, run: &CompletedRun) -> Result<(), Self::Error>;
}

impl<R: RunReporter + ?Sized> RunReporter for &mut R {
    type Error = R::Error;

    fn report(&mut self, run: &CompletedRun) -> Result<(), Self::Error> {
        (**self).report(run)
    }
}

/// Source of current UTC time, used once at startup to set the wall clock.
pub trait TimeSource {
    /// Error type for time fetch failures.
    type Error: core::fmt::Display;

    /// Returns the current UTC time in milliseconds since the Unix epoch.
    fn fetch_utc_ms(&mut self) -> Result<i64, Self::Error>;
}
