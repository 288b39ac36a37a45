//! The run tracking state machine.
//!
//! [`RunTracker`] owns the single in-flight [`Run`] and decides, for every
//! sensor or card event, whether it starts, restarts, completes, or is
//! ignored. On completion it reports the run, resets, and shows the
//! duration and velocity of the run that just finished.
//!
//! # Example
//!
//! ```rust
//! use slide_timer::{RunTracker, TrackerSettings, EventOutcome, SlideEvent};
//! use slide_timer::clock::Timestamp;
//! use slide_timer::config::SensorConfig;
//! use slide_timer::hal::{MockDisplay, MockReporter};
//!
//! let mut tracker = RunTracker::new(
//!     MockDisplay::new(),
//!     MockReporter::new(),
//!     SensorConfig::default(),
//!     TrackerSettings::default(),
//! );
//!
//! tracker.handle(SlideEvent::card(12345));
//! tracker.handle(SlideEvent::upper(Timestamp::from_millis(0)));
//! let outcome = tracker.handle(SlideEvent::lower(Timestamp::from_millis(2_000)));
//!
//! assert!(matches!(outcome, EventOutcome::Completed(run) if run.elapsed_ms == 2_000));
//! assert_eq!(tracker.reporter().reports.len(), 1);
//! assert_eq!(tracker.display().last_page(), Some(("-   Velocity   -", "10.57 mph")));
//! ```
//!
//! # Policy
//!
//! - Card reads overwrite the rider id in any phase; the last read wins.
//! - The upper sensor always (re)starts the run.
//! - The lower sensor only counts once per started run, and never before the
//!   recorded start.

use core::fmt::Write as _;

use heapless::String as HString;

use crate::clock::Timestamp;
use crate::config::{SensorConfig, TrackConfig};
use crate::events::SlideEvent;
use crate::run::{CompletedRun, ElapsedMode, Run, RunPhase};
use crate::traits::{RunReporter, SensorId, StatusDisplay};
use crate::velocity::{velocity_mph_for, TRACK_LENGTH_FEET};

/// Banner shown when a sensor trip is accepted.
pub const RECORDED_BANNER: &str = "-   Recorded   -";
/// Banner above the elapsed time.
pub const DURATION_BANNER: &str = "-   Duration   -";
/// Banner above the velocity.
pub const VELOCITY_BANNER: &str = "-   Velocity   -";
/// Banner shown when a stale run is discarded.
pub const EXPIRED_BANNER: &str = "-   Expired    -";
/// Shown after a card read.
pub const READY_TO_SLIDE: &str = "Ready to Slide!";
/// Shown instead of a speed when none can be computed.
pub const UNDEFINED_VELOCITY: &str = "undefined";

type Line = HString<24>;

/// Run policy knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerSettings {
    /// Distance between the sensors in feet.
    pub length_feet: f64,
    /// How elapsed time is computed.
    pub elapsed_mode: ElapsedMode,
    /// Discard a started run after this many milliseconds (`None` = never).
    pub stale_timeout_ms: Option<u64>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            length_feet: TRACK_LENGTH_FEET,
            elapsed_mode: ElapsedMode::Total,
            stale_timeout_ms: None,
        }
    }
}

impl From<&TrackConfig> for TrackerSettings {
    fn from(track: &TrackConfig) -> Self {
        Self {
            length_feet: track.length_feet,
            elapsed_mode: track.elapsed_mode,
            stale_timeout_ms: track.stale_timeout(),
        }
    }
}

/// Why an event had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Lower sensor fired with no run in progress, including a repeat
    /// trigger after the run it ended was reported.
    NotStarted,
    /// Lower sensor timestamp is earlier than the recorded start.
    BeforeStart,
    /// Proximity channel is not wired to either sensor.
    UnknownSensor,
}

/// What the tracker did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Rider id recorded from a card read.
    RiderRecorded(u32),
    /// A new run was started.
    Started,
    /// The start of an in-progress run was overwritten.
    Restarted,
    /// The run completed and was handed to the reporter.
    Completed(CompletedRun),
    /// The event was dropped.
    Ignored(IgnoreReason),
}

/// A completed run together with its computed speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// The run as reported.
    pub run: CompletedRun,
    /// Average speed, or `None` if it could not be computed.
    pub velocity_mph: Option<f64>,
}

/// Event-driven run tracker.
///
/// # Type Parameters
///
/// - `D`: the status display ([`StatusDisplay`])
/// - `R`: the run reporter ([`RunReporter`])
///
/// The tracker is not shared between threads; the service layer owns it
/// inside a single task and feeds it through a channel.
pub struct RunTracker<D: StatusDisplay, R: RunReporter> {
    display: D,
    reporter: R,
    sensors: SensorConfig,
    settings: TrackerSettings,
    run: Run,
    last_completed: Option<RunSummary>,
}

impl<D: StatusDisplay, R: RunReporter> RunTracker<D, R> {
    /// Creates a tracker with an empty run.
    pub fn new(display: D, reporter: R, sensors: SensorConfig, settings: TrackerSettings) -> Self {
        Self {
            display,
            reporter,
            sensors,
            settings,
            run: Run::new(),
            last_completed: None,
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Applies one event.
    pub fn handle(&mut self, event: SlideEvent) -> EventOutcome {
        match event {
            SlideEvent::CardDecoded { card_id } => self.on_card_decoded(card_id),
            SlideEvent::ObjectDetected { sensor, at } => self.on_object_detected(sensor, at),
            SlideEvent::Proximity { channel, at } => self.on_proximity(channel, at),
        }
    }

    /// Records the rider for the current run, whatever its phase.
    pub fn on_card_decoded(&mut self, card_id: u32) -> EventOutcome {
        if let Some(previous) = self.run.rider_id.replace(card_id) {
            if previous != card_id {
                log::debug!("rider {} replaced by {}", previous, card_id);
            }
        }
        log::info!("card decoded: {}", card_id);
        self.show(READY_TO_SLIDE, "");
        EventOutcome::RiderRecorded(card_id)
    }

    /// Maps a raw analog channel to a sensor and applies the trip.
    pub fn on_proximity(&mut self, channel: u8, at: Timestamp) -> EventOutcome {
        match self.sensors.identify(channel) {
            Some(sensor) => self.on_object_detected(sensor, at),
            None => {
                log::debug!("ignoring proximity event on unmapped channel {}", channel);
                EventOutcome::Ignored(IgnoreReason::UnknownSensor)
            }
        }
    }

    /// Applies a sensor trip.
    pub fn on_object_detected(&mut self, sensor: SensorId, at: Timestamp) -> EventOutcome {
        match sensor {
            SensorId::Upper => self.start(at),
            SensorId::Lower => self.finish(at),
        }
    }

    /// Discards a run that has been in progress for at least the stale
    /// timeout. Returns `true` if a run was discarded.
    pub fn expire_stale(&mut self, now: Timestamp) -> bool {
        let (Some(timeout), Some(started_at)) = (self.settings.stale_timeout_ms, self.run.started_at)
        else {
            return false;
        };
        if !self.run.is_in_progress() {
            return false;
        }
        match now.millis_since(started_at) {
            Some(age) if age >= timeout => {
                log::warn!("run started at {} abandoned after {} ms", started_at, age);
                self.run = Run::new();
                self.show(EXPIRED_BANNER, "Run abandoned");
                true
            }
            _ => false,
        }
    }

    fn start(&mut self, at: Timestamp) -> EventOutcome {
        let restarted = self.run.is_in_progress();
        self.run.started_at = Some(at);
        self.run.elapsed_ms = None;
        self.show(RECORDED_BANNER, SensorId::Upper.display_label());
        if restarted {
            log::info!("run restarted at {}", at);
            EventOutcome::Restarted
        } else {
            log::info!("run started at {}", at);
            EventOutcome::Started
        }
    }

    fn finish(&mut self, at: Timestamp) -> EventOutcome {
        if !self.run.is_in_progress() {
            return self.ignore(IgnoreReason::NotStarted);
        }
        let Some(completed) = self.run.complete(at, self.settings.elapsed_mode) else {
            return self.ignore(IgnoreReason::BeforeStart);
        };

        self.show(RECORDED_BANNER, SensorId::Lower.display_label());
        log::info!(
            "run completed: rider {:?}, {} ms",
            completed.rider_id,
            completed.elapsed_ms
        );

        if let Err(e) = self.reporter.report(&completed) {
            log::warn!("failed to report run: {}", e);
        }

        self.run = Run::new();

        let velocity = velocity_mph_for(self.settings.length_feet, completed.elapsed_ms);
        if let Err(e) = velocity {
            log::warn!("velocity unavailable: {}", e);
        }
        let summary = RunSummary {
            run: completed,
            velocity_mph: velocity.ok(),
        };
        self.show_summary(&summary);
        self.last_completed = Some(summary);

        EventOutcome::Completed(completed)
    }

    fn ignore(&self, reason: IgnoreReason) -> EventOutcome {
        log::debug!("lower sensor ignored: {:?}", reason);
        EventOutcome::Ignored(reason)
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        let mut duration = Line::new();
        let _ = write!(duration, "{} ms", summary.run.elapsed_ms);
        self.show(DURATION_BANNER, &duration);

        let mut speed = Line::new();
        let fits = match summary.velocity_mph {
            Some(mph) => write!(speed, "{:.2} mph", mph).is_ok(),
            None => false,
        };
        if !fits {
            if summary.velocity_mph.is_some() {
                log::warn!("velocity {:?} does not fit the display", summary.velocity_mph);
            }
            speed.clear();
            let _ = speed.push_str(UNDEFINED_VELOCITY);
        }
        self.show(VELOCITY_BANNER, &speed);
    }

    fn show(&mut self, line1: &str, line2: &str) {
        if let Err(e) = self.display.show(line1, line2) {
            log::warn!("display error: {:?}", e);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The in-flight run.
    pub fn current(&self) -> &Run {
        &self.run
    }

    /// Phase of the in-flight run.
    pub fn phase(&self) -> RunPhase {
        self.run.phase()
    }

    /// The most recently completed run, if any.
    pub fn last_completed(&self) -> Option<&RunSummary> {
        self.last_completed.as_ref()
    }

    /// The status display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The reporter.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}
