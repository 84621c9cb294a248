//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/configure", post(configure_handler))
        .route("/timer/preset/:minutes", post(preset_handler))
        .route("/timer/adjust", post(adjust_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/display", get(display_handler))
        .route("/display/stream", get(display_stream_handler))
        .route("/display/fullscreen", post(fullscreen_handler))
        .route("/events", get(events_handler))
        .route(
            "/preferences",
            get(get_preferences_handler).put(update_preferences_handler),
        )
        .route("/help", get(help_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
