//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::AppError,
    state::{DisplaySnapshot, Preferences, TimerEvent, Transition},
};

/// Body of `POST /timer/configure`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigureRequest {
    Text(TimeText),
    Fields(TimeFields),
}

/// `{"time": "05:30"}` or `{"time": 5}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeText {
    pub time: TimeValue,
}

/// Contents of the time field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Free-form `MM:SS` text as typed into the time field
    Text(String),
    /// A bare number means minutes
    Minutes(i64),
}

/// `{"minutes": 5, "seconds": 30}`; at least one field is required
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeFields {
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

/// Body of `POST /timer/adjust`
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustRequest {
    pub delta_seconds: i64,
}

/// Body of `POST /display/fullscreen`; a missing flag toggles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FullscreenRequest {
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Response for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub events: Vec<TimerEvent>,
    pub timer: DisplaySnapshot,
}

impl TimerResponse {
    /// Build a response from a transition, describing ignored operations
    pub fn from_transition(action: &str, transition: Transition) -> Self {
        let (status, message) = if transition.applied {
            ("ok", format!("Timer {}", action))
        } else {
            (
                "ignored",
                format!("Timer {} ignored while {:?}", action, transition.snapshot.status)
                    .to_lowercase(),
            )
        };

        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            events: transition.events,
            timer: transition.snapshot,
        }
    }
}

/// Status response with preferences and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: DisplaySnapshot,
    pub preferences: Preferences,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Timer(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Preferences(_) | AppError::Lock(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
