//! Countdown Timer - A countdown engine served over HTTP
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    config::Config,
    state::{AppState, PreferenceStore, Services},
    api::create_router,
    services::{CommandAlarm, SpeechAnnouncer},
    tasks::announcement_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}",
          config.host, config.port, config.duration);

    let preferences = PreferenceStore::load(&config.preferences).await;
    let services = Services {
        announcer: Arc::new(SpeechAnnouncer::new(config.speech())),
        alarm: Arc::new(CommandAlarm::new(config.alarm())),
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.initial_seconds(),
        preferences,
        services,
    ));

    // Deliver engine events to speech and alarm
    let announcer_state = Arc::clone(&state);
    tokio::spawn(async move {
        announcement_task(announcer_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/configure      - Set duration ({{\"time\": \"MM:SS\"}})");
    info!("  POST /timer/start|pause|toggle|reset");
    info!("  GET  /status               - Timer, preferences and uptime");
    info!("  GET  /display/stream       - Display updates (SSE)");
    info!("  GET  /events               - Timer events (SSE)");
    info!("  GET  /help                 - Usage");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
