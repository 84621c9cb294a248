//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    error::AppError,
    state::{
        timer_state::PRESET_MINUTES, AppState, DisplaySnapshot, Preferences, PreferencesPatch,
    },
};
use super::responses::{
    AdjustRequest, ConfigureRequest, FullscreenRequest, HealthResponse, StatusResponse,
    TimeFields, TimeText, TimeValue, TimerResponse,
};

/// Usage text served by `GET /help`
pub const HELP_TEXT: &str = "\
Countdown Timer

Basic use
  POST /timer/configure  {\"time\": \"05:30\"}, {\"time\": 5} or {\"minutes\": 5, \"seconds\": 30}
  POST /timer/start      start, or resume after a pause
  POST /timer/toggle     start / pause / resume
  POST /timer/pause
  POST /timer/reset

Time input
  MM:SS, e.g. 05:30 for five and a half minutes
  A bare number means minutes, e.g. 5
  Seconds of 60 or more carry into minutes
  Up to 999:59

Other controls
  POST /timer/preset/:minutes   one of the presets: 1, 3, 5, 10, 15
  POST /timer/adjust            {\"delta_seconds\": -30}
  PUT  /preferences             {\"sound_enabled\": true, \"alarm_enabled\": false}
  POST /display/fullscreen      {\"enabled\": true}, omit to toggle

Announcements
  Remaining minutes are announced every minute
  The last ten seconds are counted down
  The alarm sounds when time is up
";

/// Handle POST /timer/configure - Set the duration
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = match request {
        ConfigureRequest::Text(TimeText { time: TimeValue::Text(text) }) => {
            state.configure_text(&text)?
        }
        ConfigureRequest::Text(TimeText { time: TimeValue::Minutes(minutes) }) => {
            state.configure(minutes, 0)?
        }
        ConfigureRequest::Fields(TimeFields { minutes: None, seconds: None }) => {
            return Err(AppError::InvalidRequest(
                "Expected \"time\", \"minutes\" or \"seconds\"".to_string(),
            ));
        }
        ConfigureRequest::Fields(TimeFields { minutes, seconds }) => {
            state.configure(minutes.unwrap_or(0), seconds.unwrap_or(0))?
        }
    };
    info!("Configure endpoint called - timer set to {}", transition.snapshot.display);
    Ok(Json(TimerResponse::from_transition("configured", transition)))
}

/// Handle POST /timer/preset/:minutes - Set a preset duration
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<u64>,
) -> Result<Json<TimerResponse>, AppError> {
    if !PRESET_MINUTES.contains(&minutes) {
        return Err(AppError::InvalidRequest(format!(
            "No {} minute preset; presets are {:?}",
            minutes, PRESET_MINUTES
        )));
    }
    let transition = state.configure_preset(minutes)?;
    Ok(Json(TimerResponse::from_transition("preset applied", transition)))
}

/// Handle POST /timer/adjust - Step the duration up or down
pub async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = state.adjust(request.delta_seconds)?;
    Ok(Json(TimerResponse::from_transition("adjusted", transition)))
}

/// Handle POST /timer/start - Start or resume the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = state.start()?;
    info!("Start endpoint called - {} remaining", transition.snapshot.display);
    Ok(Json(TimerResponse::from_transition("started", transition)))
}

/// Handle POST /timer/pause - Pause the countdown
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = state.pause()?;
    Ok(Json(TimerResponse::from_transition("paused", transition)))
}

/// Handle POST /timer/toggle - Start, pause or resume depending on status
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = state.toggle()?;
    Ok(Json(TimerResponse::from_transition("toggled", transition)))
}

/// Handle POST /timer/reset - Stop and restore the configured duration
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, AppError> {
    let transition = state.reset()?;
    Ok(Json(TimerResponse::from_transition("reset", transition)))
}

/// Handle GET /status - Return timer, preferences and server info
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    Ok(Json(StatusResponse {
        timer: state.get_snapshot()?,
        preferences: state.get_preferences()?,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
    }))
}

/// Handle GET /display - Current display snapshot
pub async fn display_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DisplaySnapshot>, AppError> {
    Ok(Json(state.get_snapshot()?))
}

/// Handle GET /display/stream - Snapshot on connect, then one per change
pub async fn display_stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.subscribe_display();

    let updates = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default().event("display").json_data(&snapshot);
        Some((event, (rx, false)))
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}

/// Handle POST /display/fullscreen - Enter, exit or toggle fullscreen mode
pub async fn fullscreen_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<FullscreenRequest>>,
) -> Result<Json<DisplaySnapshot>, AppError> {
    let enabled = request.and_then(|Json(body)| body.enabled);
    Ok(Json(state.set_fullscreen(enabled)?))
}

/// Handle GET /events - Stream engine events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.subscribe_events();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = Event::default().event(event.name()).json_data(&event);
                    return Some((sse, rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /preferences
pub async fn get_preferences_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Preferences>, AppError> {
    Ok(Json(state.get_preferences()?))
}

/// Handle PUT /preferences - Partial update of the sound and alarm flags
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<Preferences>, AppError> {
    Ok(Json(state.update_preferences(patch).await?))
}

/// Handle GET /help - Usage text
pub async fn help_handler() -> &'static str {
    HELP_TEXT
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
