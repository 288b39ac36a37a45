//! The event loop that owns the run tracker.
//!
//! Sensor and card sources hold an [`EventSender`]; a single
//! [`SlideService`] task drains the bounded queue and applies events to the
//! tracker one at a time, so no two events ever interleave. After every
//! change it publishes a [`TrackerSnapshot`] on a `watch` channel for
//! read-only observers such as the web status API.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use slide_timer::clock::WallClock;
//! use slide_timer::config::{SensorConfig, ServiceConfig};
//! use slide_timer::hal::{MockDisplay, MockReporter, SystemClock};
//! use slide_timer::services::SlideService;
//! use slide_timer::{RunTracker, TrackerSettings, SlideEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tracker = RunTracker::new(
//!     MockDisplay::new(),
//!     MockReporter::new(),
//!     SensorConfig::default(),
//!     TrackerSettings::default(),
//! );
//! let wall = Arc::new(WallClock::new(SystemClock::new()));
//! let (service, sender, _snapshots) = SlideService::new(tracker, wall, &ServiceConfig::default());
//! let task = tokio::spawn(service.run());
//!
//! sender.send(SlideEvent::card(42)).await.unwrap();
//! drop(sender);
//!
//! let tracker = task.await.unwrap();
//! assert_eq!(tracker.current().rider_id, Some(42));
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::clock::WallClock;
use crate::config::ServiceConfig;
use crate::events::SlideEvent;
use crate::report::SlideRunReport;
use crate::run::RunPhase;
use crate::tracker::{EventOutcome, RunSummary, RunTracker};
use crate::traits::{Clock, RunReporter, StatusDisplay};

use super::api::outcome_label;

// ============================================================================
// Snapshot
// ============================================================================

/// The most recent completed run, as shown on the status API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedRunView {
    /// Report body that was sent for the run.
    #[serde(flatten)]
    pub report: SlideRunReport,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Average speed, absent when it could not be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_mph: Option<f64>,
}

impl From<&RunSummary> for CompletedRunView {
    fn from(summary: &RunSummary) -> Self {
        Self {
            report: SlideRunReport::from(&summary.run),
            elapsed_ms: summary.run.elapsed_ms,
            velocity_mph: summary.velocity_mph,
        }
    }
}

/// Read-only view of the tracker, published after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Phase of the in-flight run.
    pub phase: RunPhase,
    /// Rider recorded for the in-flight run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<u32>,
    /// Start time of the in-flight run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Last completed run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<CompletedRunView>,
    /// Runs completed since the service started.
    pub runs_completed: u64,
    /// Runs discarded as stale since the service started.
    pub runs_expired: u64,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            phase: RunPhase::Unstarted,
            rider_id: None,
            started_at: None,
            last_run: None,
            runs_completed: 0,
            runs_expired: 0,
        }
    }
}

impl TrackerSnapshot {
    fn capture<D: StatusDisplay, R: RunReporter>(
        tracker: &RunTracker<D, R>,
        runs_completed: u64,
        runs_expired: u64,
    ) -> Self {
        let run = tracker.current();
        Self {
            phase: tracker.phase(),
            rider_id: run.rider_id,
            started_at: run.started_at.map(|t| t.to_string()),
            last_run: tracker.last_completed().map(CompletedRunView::from),
            runs_completed,
            runs_expired,
        }
    }
}

// ============================================================================
// Sender
// ============================================================================

/// Why an event could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EventSendError {
    /// The queue is at capacity.
    #[error("event queue is full")]
    Full(SlideEvent),
    /// The service has stopped.
    #[error("event loop has stopped")]
    Closed(SlideEvent),
}

/// Cloneable handle for pushing events into the service.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<SlideEvent>,
}

impl EventSender {
    /// Queues an event without waiting, for interrupt-like contexts.
    pub fn try_send(&self, event: SlideEvent) -> Result<(), EventSendError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(ev) => EventSendError::Full(ev),
            mpsc::error::TrySendError::Closed(ev) => EventSendError::Closed(ev),
        })
    }

    /// Queues an event, waiting for space.
    pub async fn send(&self, event: SlideEvent) -> Result<(), EventSendError> {
        self.tx
            .send(event)
            .await
            .map_err(|e| EventSendError::Closed(e.0))
    }

    /// Whether the service has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Owns the tracker and applies queued events in order.
pub struct SlideService<D: StatusDisplay, R: RunReporter, C: Clock> {
    tracker: RunTracker<D, R>,
    wall: Arc<WallClock<C>>,
    rx: mpsc::Receiver<SlideEvent>,
    snapshots: watch::Sender<TrackerSnapshot>,
    stale_check: Duration,
    runs_completed: u64,
    runs_expired: u64,
}

impl<D, R, C> SlideService<D, R, C>
where
    D: StatusDisplay,
    R: RunReporter,
    C: Clock,
{
    /// Creates the service with its event sender and snapshot receiver.
    pub fn new(
        tracker: RunTracker<D, R>,
        wall: Arc<WallClock<C>>,
        config: &ServiceConfig,
    ) -> (Self, EventSender, watch::Receiver<TrackerSnapshot>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let initial = TrackerSnapshot::capture(&tracker, 0, 0);
        let (snapshots, snapshot_rx) = watch::channel(initial);
        let service = Self {
            tracker,
            wall,
            rx,
            snapshots,
            stale_check: Duration::from_millis(u64::from(config.stale_check_interval_ms.max(1))),
            runs_completed: 0,
            runs_expired: 0,
        };
        (service, EventSender { tx }, snapshot_rx)
    }

    /// Applies one event and publishes the new snapshot.
    pub fn apply(&mut self, event: SlideEvent) -> EventOutcome {
        let outcome = self.tracker.handle(event);
        if let EventOutcome::Completed(_) = outcome {
            self.runs_completed += 1;
        }
        self.publish();
        outcome
    }

    /// Discards a stale run, if any, and publishes the change.
    pub fn check_stale(&mut self) -> bool {
        let expired = self.tracker.expire_stale(self.wall.now());
        if expired {
            self.runs_expired += 1;
            self.publish();
        }
        expired
    }

    /// Runs until every [`EventSender`] is dropped, then returns the tracker.
    pub async fn run(mut self) -> RunTracker<D, R> {
        let mut ticker = tokio::time::interval(self.stale_check);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("slide service started");

        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => {
                        let outcome = self.apply(event);
                        log::debug!("{:?} -> {}", event, outcome_label(&outcome));
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    self.check_stale();
                }
            }
        }

        log::info!("slide service stopped");
        self.tracker
    }

    fn publish(&self) {
        let snapshot = TrackerSnapshot::capture(&self.tracker, self.runs_completed, self.runs_expired);
        self.snapshots.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::config::SensorConfig;
    use crate::hal::{MockClock, MockDisplay, MockReporter};
    use crate::tracker::TrackerSettings;

    type TestService = SlideService<MockDisplay, MockReporter, MockClock>;

    fn service() -> (TestService, EventSender, watch::Receiver<TrackerSnapshot>) {
        let tracker = RunTracker::new(
            MockDisplay::new(),
            MockReporter::new(),
            SensorConfig::default(),
            TrackerSettings::default(),
        );
        SlideService::new(
            tracker,
            Arc::new(WallClock::new(MockClock::new())),
            &ServiceConfig::default(),
        )
    }

    #[test]
    fn apply_publishes_snapshot() {
        let (mut svc, _tx, rx) = service();
        svc.apply(SlideEvent::card(8));
        svc.apply(SlideEvent::upper(Timestamp::from_millis(0)));

        let snap = rx.borrow().clone();
        assert_eq!(snap.phase, RunPhase::Started);
        assert_eq!(snap.rider_id, Some(8));
        assert_eq!(snap.started_at.as_deref(), Some("01/01/1970 00:00:00"));
    }

    #[test]
    fn completion_counts_and_records_last_run() {
        let (mut svc, _tx, rx) = service();
        svc.apply(SlideEvent::upper(Timestamp::from_millis(0)));
        svc.apply(SlideEvent::lower(Timestamp::from_millis(2_000)));

        let snap = rx.borrow().clone();
        assert_eq!(snap.phase, RunPhase::Unstarted);
        assert_eq!(snap.runs_completed, 1);
        let last = snap.last_run.unwrap();
        assert_eq!(last.elapsed_ms, 2_000);
        assert_eq!(last.report.keyfob_num, "0");
        assert!((last.velocity_mph.unwrap() - 10.57).abs() < 0.01);
    }

    #[test]
    fn try_send_reports_full_queue() {
        let tracker = RunTracker::new(
            MockDisplay::new(),
            MockReporter::new(),
            SensorConfig::default(),
            TrackerSettings::default(),
        );
        let (_svc, tx, _rx) = SlideService::new(
            tracker,
            Arc::new(WallClock::new(MockClock::new())),
            &ServiceConfig::default().with_queue_capacity(1),
        );
        assert!(tx.try_send(SlideEvent::card(1)).is_ok());
        assert_eq!(
            tx.try_send(SlideEvent::card(2)),
            Err(EventSendError::Full(SlideEvent::card(2)))
        );
    }

    #[test]
    fn snapshot_json_shape() {
        let json = serde_json::to_value(TrackerSnapshot::default()).unwrap();
        assert_eq!(json["phase"], "unstarted");
        assert_eq!(json["runs_completed"], 0);
        assert!(json.get("rider_id").is_none());
    }
}
