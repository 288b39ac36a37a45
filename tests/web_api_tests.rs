//! Integration tests for the web API.
//!
//! These tests verify the HTTP API endpoints work correctly against a
//! running event loop.

#![cfg(feature = "web")]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use slide_timer::clock::WallClock;
use slide_timer::config::{SensorConfig, ServiceConfig};
use slide_timer::hal::{MockDisplay, MockReporter, SystemClock};
use slide_timer::services::{
    build_router, ApiResponse, AppState, EventResponse, SlideService, TrackerSnapshot,
    WebServerConfig,
};
use slide_timer::{RunPhase, RunTracker, TrackerSettings};

fn create_test_app() -> axum::Router {
    let tracker = RunTracker::new(
        MockDisplay::new(),
        MockReporter::new(),
        SensorConfig::default(),
        TrackerSettings::default(),
    );
    let wall = Arc::new(WallClock::new(SystemClock::new()));
    let (service, sender, snapshots) =
        SlideService::new(tracker, Arc::clone(&wall), &ServiceConfig::default());
    tokio::spawn(service.run());

    let state = Arc::new(AppState::new(sender, snapshots, wall));
    build_router(state, &WebServerConfig::default())
}

async fn post(app: &axum::Router, uri: &str, body: &'static str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_state(app: &axum::Router) -> TrackerSnapshot {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: ApiResponse<TrackerSnapshot> = serde_json::from_slice(&body).unwrap();
    assert!(json.success);
    json.data.unwrap()
}

/// Polls the state endpoint until `pred` holds.
async fn wait_for_state<F: Fn(&TrackerSnapshot) -> bool>(app: &axum::Router, pred: F) -> TrackerSnapshot {
    for _ in 0..100 {
        let state = get_state(app).await;
        if pred(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("state condition not reached");
}

#[tokio::test]
async fn test_get_initial_state() {
    let app = create_test_app();
    let state = get_state(&app).await;

    assert_eq!(state.phase, RunPhase::Unstarted);
    assert_eq!(state.rider_id, None);
    assert!(state.last_run.is_none());
    assert_eq!(state.runs_completed, 0);
}

#[tokio::test]
async fn test_post_card() {
    let app = create_test_app();

    let (status, json) = post(&app, "/api/card", r#"{"card_id": 12345}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["queued"], "card");

    let state = wait_for_state(&app, |s| s.rider_id.is_some()).await;
    assert_eq!(state.rider_id, Some(12345));
}

#[tokio::test]
async fn test_full_run_through_api() {
    let app = create_test_app();

    post(&app, "/api/card", r#"{"card_id": 8}"#).await;
    let (_, json) = post(&app, "/api/sensor", r#"{"sensor": "upper"}"#).await;
    let queued: ApiResponse<EventResponse> = serde_json::from_value(json).unwrap();
    assert_eq!(queued.data.unwrap().queued, "upper");

    wait_for_state(&app, |s| s.phase == RunPhase::Started).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    post(&app, "/api/sensor", r#"{"sensor": "lower"}"#).await;

    let state = wait_for_state(&app, |s| s.runs_completed == 1).await;
    let last = state.last_run.unwrap();
    assert_eq!(last.report.keyfob_num, "8");
    assert!(last.elapsed_ms >= 20);
    assert!(last.velocity_mph.is_some());
    assert_eq!(state.phase, RunPhase::Unstarted);
}

#[tokio::test]
async fn test_lower_without_start_changes_nothing() {
    let app = create_test_app();

    let (_, json) = post(&app, "/api/sensor", r#"{"sensor": "bottom"}"#).await;
    assert_eq!(json["data"]["queued"], "lower");

    tokio::time::sleep(Duration::from_millis(30)).await;
    let state = get_state(&app).await;
    assert_eq!(state.phase, RunPhase::Unstarted);
    assert_eq!(state.runs_completed, 0);
}

#[tokio::test]
async fn test_invalid_card_body() {
    let app = create_test_app();

    let (status, json) = post(&app, "/api/card", r#"{"card": "abc"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid card request");
}

#[tokio::test]
async fn test_unknown_sensor_name() {
    let app = create_test_app();

    let (_, json) = post(&app, "/api/sensor", r#"{"sensor": "middle"}"#).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
