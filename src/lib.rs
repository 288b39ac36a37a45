//! # slide-timer
//!
//! Times riders down a slide using two proximity sensors and an RFID reader,
//! then reports each run to a remote service.
//!
//! ## Features
//!
//! - **Run tracking**: an event-driven state machine that correlates card
//!   reads and sensor trips into one run, dropping duplicate and
//!   out-of-order signals
//! - **Velocity**: average speed over the timed section in miles per hour
//! - **Reporting**: JSON run reports POSTed fire-and-forget over HTTP
//! - **Hardware abstraction**: traits for the display, reporter, clock and
//!   time source, with mocks for desktop testing
//!
//! ## Architecture
//!
//! - `traits` - Collaborator abstractions
//! - `run` / `tracker` - Run records and the state machine
//! - `velocity` / `report` - Derived metric and wire format
//! - `clock` / `startup` - Wall-clock time and the boot sequence
//! - `hal` - Concrete implementations (mock for testing, desktop for the bench)
//! - `services` - Event loop actor, HTTP reporter, SNTP, web API (feature-gated)
//!
//! ## Example
//!
//! ```rust
//! use slide_timer::{
//!     RunTracker, TrackerSettings, SlideEvent, EventOutcome, SlideRunReport,
//!     clock::Timestamp,
//!     config::SensorConfig,
//!     hal::{MockDisplay, MockReporter},
//! };
//!
//! let mut tracker = RunTracker::new(
//!     MockDisplay::new(),
//!     MockReporter::new(),
//!     SensorConfig::default(),
//!     TrackerSettings::default(),
//! );
//!
//! // 2024-06-01 12:00:00 local
//! let t0 = Timestamp::from_millis(1_717_243_200_000);
//!
//! tracker.handle(SlideEvent::card(12345));
//! tracker.handle(SlideEvent::upper(t0));
//! tracker.handle(SlideEvent::lower(t0.add_ms(2_000)));
//!
//! let run = tracker.reporter().reports[0];
//! assert_eq!(
//!     SlideRunReport::from(&run).to_json(),
//!     r#"{"keyfobNum":"12345","startTimeStamp":"06/01/2024 12:00:00","endTimeStamp":"06/01/2024 12:00:02"}"#
//! );
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Wall-clock timestamps and clock synchronization.
pub mod clock;
/// Shared configuration with builder-style setters.
pub mod config;
/// Typed events consumed by the tracker.
pub mod events;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// JSON run report sent to the remote service.
pub mod report;
/// Run records and lifecycle.
pub mod run;
/// Boot sequence: module announcements and clock sync.
pub mod startup;
/// The run tracking state machine.
pub mod tracker;
/// Core traits for the tracker's collaborators.
pub mod traits;
/// Velocity over the timed section.
pub mod velocity;

/// Runtime services: event loop, HTTP reporter, SNTP, web API (feature-gated).
#[cfg(feature = "net")]
pub mod services;

// Re-exports for convenience
pub use clock::{Timestamp, WallClock};
pub use events::SlideEvent;
pub use report::{SlideRunReport, UNKNOWN_RIDER};
pub use run::{CompletedRun, ElapsedMode, Run, RunPhase};
pub use tracker::{EventOutcome, IgnoreReason, RunSummary, RunTracker, TrackerSettings};
pub use traits::{Clock, RunReporter, SensorId, StatusDisplay, TimeSource};
pub use velocity::{velocity_mph, velocity_mph_for, VelocityError};

// Config re-exports
pub use config::{
    ApiConfig, ClockConfig, Config, DeviceConfig, SensorConfig, ServiceConfig, TrackConfig,
    WebConfig,
};
