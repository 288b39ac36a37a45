//! Request and response types for the status and bench-injection API.

use serde::{Deserialize, Serialize};

use crate::tracker::{EventOutcome, IgnoreReason};

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Acknowledgement for an injected event.
///
/// The event is queued, not yet applied; `queued` reports which event the
/// service will see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    /// Short name of the queued event (`card`, `upper`, `lower`).
    pub queued: String,
    /// Timestamp stamped on sensor events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

// ============================================================================
// Request Types
// ============================================================================

/// `POST /api/card` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRequest {
    /// Decoded card number.
    pub card_id: u32,
}

/// `POST /api/sensor` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRequest {
    /// `upper` or `lower` (also accepts `top`/`bottom`, `start`/`end`).
    pub sensor: String,
}

/// Stable string for an event outcome, used in logs and the API.
pub fn outcome_label(outcome: &EventOutcome) -> &'static str {
    match outcome {
        EventOutcome::RiderRecorded(_) => "rider_recorded",
        EventOutcome::Started => "started",
        EventOutcome::Restarted => "restarted",
        EventOutcome::Completed(_) => "completed",
        EventOutcome::Ignored(IgnoreReason::NotStarted) => "ignored_not_started",
        EventOutcome::Ignored(IgnoreReason::BeforeStart) => "ignored_before_start",
        EventOutcome::Ignored(IgnoreReason::UnknownSensor) => "ignored_unknown_sensor",
    }
}
