//! End-to-end tests for the HTTP run reporter against a local server.

#![cfg(feature = "web")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};

use slide_timer::clock::Timestamp;
use slide_timer::config::ApiConfig;
use slide_timer::run::CompletedRun;
use slide_timer::services::{HttpReporter, ReportError};
use slide_timer::traits::RunReporter;
use slide_timer::SlideRunReport;

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HeaderMap, String)>>>,
}

async fn capture(State(captured): State<Captured>, headers: HeaderMap, body: String) -> &'static str {
    captured.requests.lock().unwrap().push((headers, body));
    "OK"
}

/// Starts a server answering `/slideruns` and returns its port.
async fn start_server(status: StatusCode) -> (u16, Captured) {
    let captured = Captured::default();
    let app = if status.is_success() {
        Router::new()
            .route("/slideruns", post(capture))
            .with_state(captured.clone())
    } else {
        Router::new().route("/slideruns", post(move || async move { (status, "nope") }))
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (port, captured)
}

fn sample_run() -> CompletedRun {
    CompletedRun {
        rider_id: Some(12345),
        // 2024-06-01 12:00:00 local
        started_at: Timestamp::from_millis(1_717_243_200_000),
        elapsed_ms: 2_000,
    }
}

fn config_for(port: u16) -> ApiConfig {
    ApiConfig::default()
        .with_host("127.0.0.1")
        .with_port(port)
        .with_timeout_ms(2_000)
}

#[tokio::test]
async fn post_sends_json_with_headers() {
    let (port, captured) = start_server(StatusCode::OK).await;
    let reporter = HttpReporter::new(&config_for(port)).unwrap();

    reporter
        .post(&SlideRunReport::from(&sample_run()))
        .await
        .unwrap();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["accept"], "text/plain");
    assert_eq!(
        body,
        r#"{"keyfobNum":"12345","startTimeStamp":"06/01/2024 12:00:00","endTimeStamp":"06/01/2024 12:00:02"}"#
    );
}

#[tokio::test]
async fn report_is_fire_and_forget() {
    let (port, captured) = start_server(StatusCode::OK).await;
    let mut reporter = HttpReporter::new(&config_for(port)).unwrap();

    reporter.report(&sample_run()).unwrap();

    for _ in 0..100 {
        if !captured.requests.lock().unwrap().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("report never arrived");
}

#[tokio::test]
async fn non_success_status_is_error() {
    let (port, _) = start_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let reporter = HttpReporter::new(&config_for(port)).unwrap();

    let result = reporter.post(&SlideRunReport::from(&sample_run())).await;
    assert!(matches!(result, Err(ReportError::Status(500))));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let reporter = HttpReporter::new(&config_for(port)).unwrap();
    let result = reporter.post(&SlideRunReport::from(&sample_run())).await;
    assert!(matches!(result, Err(ReportError::Transport(_))));
}

#[tokio::test]
async fn failed_delivery_does_not_surface_from_report() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut reporter = HttpReporter::new(&config_for(port)).unwrap();
    assert!(reporter.report(&sample_run()).is_ok());
}
