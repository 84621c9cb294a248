//! Delivers engine events to the speech and alarm services

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, Preferences, TimerEvent};

/// Text spoken for an engine event
pub fn utterance(event: &TimerEvent) -> String {
    match event {
        TimerEvent::Started { remaining_seconds } => format!(
            "Timer started for {} minutes {} seconds",
            remaining_seconds / 60,
            remaining_seconds % 60
        ),
        TimerEvent::Paused => "Timer paused".to_string(),
        TimerEvent::Reset => "Timer reset".to_string(),
        TimerEvent::MinuteRemaining { minutes: 1 } => "1 minute remaining".to_string(),
        TimerEvent::MinuteRemaining { minutes } => format!("{} minutes remaining", minutes),
        TimerEvent::SecondsCountdown { seconds } => seconds.to_string(),
        TimerEvent::Finished => "Time's up!".to_string(),
    }
}

/// Background task that speaks events and sounds the alarm on completion,
/// as allowed by the current preferences
pub async fn announcement_task(state: Arc<AppState>) {
    info!("Starting announcement task");

    let mut events = state.subscribe_events();
    let mut previous: Option<TimerEvent> = None;

    loop {
        match events.recv().await {
            Ok(event) => {
                let preferences = match state.get_preferences() {
                    Ok(prefs) => prefs,
                    Err(e) => {
                        warn!("Failed to read preferences, using defaults: {}", e);
                        Preferences::default()
                    }
                };
                deliver(&state, previous.as_ref(), &event, preferences);
                previous = Some(event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Announcement task lagged, skipped {} events", skipped);
                previous = None;
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping announcement task");
                break;
            }
        }
    }
}

/// Whether `event` gets its own utterance.
///
/// Starting inside the last ten seconds emits the current second right after
/// `Started`; speaking it would cut the start sentence off, so the count
/// resumes with the next tick.
pub fn is_spoken(previous: Option<&TimerEvent>, event: &TimerEvent) -> bool {
    match (previous, event) {
        (
            Some(TimerEvent::Started { remaining_seconds }),
            TimerEvent::SecondsCountdown { seconds },
        ) => remaining_seconds != seconds,
        _ => true,
    }
}

fn deliver(
    state: &AppState,
    previous: Option<&TimerEvent>,
    event: &TimerEvent,
    preferences: Preferences,
) {
    debug!("Delivering {:?}", event);

    if preferences.sound_enabled && is_spoken(previous, event) {
        state.services.announcer.speak(&utterance(event));
    }
    if *event == TimerEvent::Finished && preferences.alarm_enabled {
        state.services.alarm.play();
    }
}
