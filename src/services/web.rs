//! Axum-based HTTP server for status and bench testing.
//!
//! Provides REST endpoints for:
//! - GET `/api/state` - Current tracker snapshot
//! - POST `/api/card` - Inject a card read: `{"card_id": 12345}`
//! - POST `/api/sensor` - Inject a sensor trip: `{"sensor": "upper"}`
//!
//! Injected sensor trips are stamped with the shared wall clock when the
//! request arrives, then queued like any hardware event.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::clock::WallClock;
use crate::config::WebConfig;
use crate::events::SlideEvent;
use crate::traits::{Clock, SensorId};

use super::actor::{EventSendError, EventSender, TrackerSnapshot};
use super::api::{ApiResponse, CardRequest, EventResponse, SensorRequest};

// ============================================================================
// Shared State
// ============================================================================

/// Handles the web server needs to observe and feed the service.
pub struct AppState<C: Clock> {
    /// Queue into the event loop.
    pub sender: EventSender,
    /// Latest tracker snapshot.
    pub snapshots: watch::Receiver<TrackerSnapshot>,
    /// Clock used to stamp injected sensor trips.
    pub wall: Arc<WallClock<C>>,
}

impl<C: Clock> AppState<C> {
    /// Bundles the service handles.
    pub fn new(
        sender: EventSender,
        snapshots: watch::Receiver<TrackerSnapshot>,
        wall: Arc<WallClock<C>>,
    ) -> Self {
        Self {
            sender,
            snapshots,
            wall,
        }
    }

    fn queue(&self, event: SlideEvent) -> Result<(), &'static str> {
        self.sender.try_send(event).map_err(|e| match e {
            EventSendError::Full(_) => "Event queue full",
            EventSendError::Closed(_) => "Event loop stopped",
        })
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/state - Returns the current tracker snapshot
async fn get_state<C: Clock + Send + Sync + 'static>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<ApiResponse<TrackerSnapshot>> {
    let snapshot = state.snapshots.borrow().clone();
    Json(ApiResponse::ok(snapshot))
}

/// POST /api/card - Queue a card read
async fn post_card<C: Clock + Send + Sync + 'static>(
    State(state): State<Arc<AppState<C>>>,
    body: Bytes,
) -> Json<ApiResponse<EventResponse>> {
    let Ok(request) = serde_json::from_slice::<CardRequest>(&body) else {
        return Json(ApiResponse::err("Invalid card request"));
    };

    match state.queue(SlideEvent::card(request.card_id)) {
        Ok(()) => Json(ApiResponse::ok(EventResponse {
            queued: "card".into(),
            at: None,
        })),
        Err(message) => Json(ApiResponse::err(message)),
    }
}

/// POST /api/sensor - Queue a sensor trip stamped with the current time
async fn post_sensor<C: Clock + Send + Sync + 'static>(
    State(state): State<Arc<AppState<C>>>,
    body: Bytes,
) -> Json<ApiResponse<EventResponse>> {
    let Ok(request) = serde_json::from_slice::<SensorRequest>(&body) else {
        return Json(ApiResponse::err("Invalid sensor request"));
    };
    let Some(sensor) = SensorId::from_text(&request.sensor) else {
        return Json(ApiResponse::err("Sensor must be \"upper\" or \"lower\""));
    };

    let at = state.wall.now();
    match state.queue(SlideEvent::ObjectDetected { sensor, at }) {
        Ok(()) => Json(ApiResponse::ok(EventResponse {
            queued: sensor.as_str().into(),
            at: Some(at.to_string()),
        })),
        Err(message) => Json(ApiResponse::err(message)),
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<C: Clock + Send + Sync + 'static>(
    state: Arc<AppState<C>>,
    config: &WebServerConfig,
) -> Router {
    let mut router = Router::new()
        .route("/api/state", get(get_state::<C>))
        .route("/api/card", post(post_card::<C>))
        .route("/api/sensor", post(post_sensor::<C>))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server
///
/// Runs until the listener fails.
pub async fn run_server<C: Clock + Send + Sync + 'static>(
    state: Arc<AppState<C>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("web server listening on http://{}", config.addr);

    axum::serve(listener, router).await
}
