//! Integration tests for run tracking through the public API.

use slide_timer::{
    clock::Timestamp,
    config::{SensorConfig, TrackConfig},
    hal::{MockDisplay, MockReporter},
    tracker::{DURATION_BANNER, RECORDED_BANNER, VELOCITY_BANNER},
    ElapsedMode, EventOutcome, IgnoreReason, RunPhase, RunTracker, SensorId, SlideEvent,
    SlideRunReport, TrackerSettings,
};

// 2024-06-01 12:00:00 local
const NOON: i64 = 1_717_243_200_000;

fn at(offset_ms: i64) -> Timestamp {
    Timestamp::from_millis(NOON + offset_ms)
}

fn new_tracker() -> RunTracker<MockDisplay, MockReporter> {
    RunTracker::new(
        MockDisplay::new(),
        MockReporter::new(),
        SensorConfig::default(),
        TrackerSettings::default(),
    )
}

// ============================================================================
// Complete Runs
// ============================================================================

#[test]
fn two_second_run_end_to_end() {
    let mut tracker = new_tracker();

    tracker.handle(SlideEvent::card(12345));
    assert_eq!(tracker.handle(SlideEvent::upper(at(0))), EventOutcome::Started);
    let outcome = tracker.handle(SlideEvent::lower(at(2_000)));

    let EventOutcome::Completed(run) = outcome else {
        panic!("expected completion, got {:?}", outcome);
    };
    assert_eq!(run.elapsed_ms, 2_000);
    assert_eq!(run.rider_id, Some(12345));

    let reports = &tracker.reporter().reports;
    assert_eq!(reports.len(), 1);
    let body = SlideRunReport::from(&reports[0]).to_json();
    assert_eq!(
        body,
        r#"{"keyfobNum":"12345","startTimeStamp":"06/01/2024 12:00:00","endTimeStamp":"06/01/2024 12:00:02"}"#
    );

    let summary = tracker.last_completed().unwrap();
    assert!((summary.velocity_mph.unwrap() - 10.568).abs() < 0.01);
}

#[test]
fn tracker_resets_after_completion() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::card(7));
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::lower(at(1_000)));

    assert_eq!(tracker.phase(), RunPhase::Unstarted);
    assert_eq!(tracker.current().rider_id, None);
    assert_eq!(tracker.current().started_at, None);
    assert_eq!(tracker.current().elapsed_ms, None);
}

#[test]
fn display_shows_completed_values_not_reset_values() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::lower(at(3_100)));

    let pages = tracker.display().pages_as_str();
    let n = pages.len();
    assert_eq!(pages[n - 2], (DURATION_BANNER, "3100 ms"));
    assert_eq!(pages[n - 1], (VELOCITY_BANNER, "6.82 mph"));
}

#[test]
fn consecutive_runs_each_report_once() {
    let mut tracker = new_tracker();
    for (i, rider) in [11u32, 22, 33].into_iter().enumerate() {
        let base = i as i64 * 10_000;
        tracker.handle(SlideEvent::card(rider));
        tracker.handle(SlideEvent::upper(at(base)));
        tracker.handle(SlideEvent::lower(at(base + 1_500)));
    }

    let riders: Vec<_> = tracker
        .reporter()
        .reports
        .iter()
        .map(|r| r.rider_id)
        .collect();
    assert_eq!(riders, vec![Some(11), Some(22), Some(33)]);
}

// ============================================================================
// Rider Identity
// ============================================================================

#[test]
fn last_card_wins() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::card(1));
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::card(2));
    tracker.handle(SlideEvent::lower(at(900)));

    assert_eq!(tracker.reporter().reports[0].rider_id, Some(2));
}

#[test]
fn run_without_card_reports_rider_zero() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::lower(at(900)));

    let report = SlideRunReport::from(&tracker.reporter().reports[0]);
    assert_eq!(report.keyfob_num, "0");
}

#[test]
fn card_during_started_run_keeps_start() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::card(5));
    assert_eq!(tracker.phase(), RunPhase::Started);
    assert_eq!(tracker.current().started_at, Some(at(0)));
}

// ============================================================================
// Rejected Events
// ============================================================================

#[test]
fn second_lower_after_completion_is_ignored() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::lower(at(1_000)));
    // A completed run is replaced before `handle` returns
    assert_eq!(tracker.phase(), RunPhase::Unstarted);
    let pages_before = tracker.display().pages.len();

    let outcome = tracker.handle(SlideEvent::lower(at(1_050)));

    assert_eq!(outcome, EventOutcome::Ignored(IgnoreReason::NotStarted));
    assert_eq!(tracker.phase(), RunPhase::Unstarted);
    assert_eq!(tracker.reporter().reports.len(), 1);
    assert_eq!(tracker.display().pages.len(), pages_before);
}

#[test]
fn upper_retrigger_restarts_timing() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    assert_eq!(tracker.handle(SlideEvent::upper(at(500))), EventOutcome::Restarted);
    tracker.handle(SlideEvent::lower(at(2_500)));

    assert_eq!(tracker.reporter().reports[0].elapsed_ms, 2_000);
}

#[test]
fn raw_channels_follow_wiring() {
    let sensors = SensorConfig::default()
        .with_upper_channel(4)
        .with_lower_channel(5);
    let mut tracker = RunTracker::new(
        MockDisplay::new(),
        MockReporter::new(),
        sensors,
        TrackerSettings::default(),
    );

    assert_eq!(
        tracker.handle(SlideEvent::Proximity { channel: 0, at: at(0) }),
        EventOutcome::Ignored(IgnoreReason::UnknownSensor)
    );
    assert_eq!(
        tracker.handle(SlideEvent::Proximity { channel: 4, at: at(0) }),
        EventOutcome::Started
    );
    assert!(matches!(
        tracker.handle(SlideEvent::Proximity { channel: 5, at: at(800) }),
        EventOutcome::Completed(_)
    ));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn millisecond_component_mode_matches_legacy_controller() {
    let track = TrackConfig::default().with_elapsed_mode(ElapsedMode::MillisecondComponent);
    let mut tracker = RunTracker::new(
        MockDisplay::new(),
        MockReporter::new(),
        SensorConfig::default(),
        TrackerSettings::from(&track),
    );

    tracker.on_object_detected(SensorId::Upper, at(0));
    tracker.on_object_detected(SensorId::Lower, at(2_345));

    let run = tracker.reporter().reports[0];
    assert_eq!(run.elapsed_ms, 345);
    assert_eq!(run.ended_at(), at(345));
}

#[test]
fn custom_track_length_changes_velocity() {
    let track = TrackConfig::default().with_length_feet(62.0);
    let mut tracker = RunTracker::new(
        MockDisplay::new(),
        MockReporter::new(),
        SensorConfig::default(),
        TrackerSettings::from(&track),
    );

    tracker.handle(SlideEvent::upper(at(0)));
    tracker.handle(SlideEvent::lower(at(2_000)));

    let mph = tracker.last_completed().unwrap().velocity_mph.unwrap();
    assert!((mph - 21.14).abs() < 0.01);
}

#[test]
fn sensor_pages_use_recorded_banner() {
    let mut tracker = new_tracker();
    tracker.handle(SlideEvent::upper(at(0)));
    assert_eq!(
        tracker.display().last_page(),
        Some((RECORDED_BANNER, "Upper sensor"))
    );
}
