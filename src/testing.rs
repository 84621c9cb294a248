//! Test doubles shared by unit tests

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;

use crate::{
    services::{AlarmPlayer, Announcer},
    state::{AppState, PreferenceStore, Preferences, Services},
};

/// Records each utterance with the time since the announcer was created
#[derive(Debug)]
pub struct RecordingAnnouncer {
    created: Instant,
    spoken: Mutex<Vec<(Duration, String)>>,
}

impl Default for RecordingAnnouncer {
    fn default() -> Self {
        Self {
            created: Instant::now(),
            spoken: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingAnnouncer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken_at().into_iter().map(|(_, text)| text).collect()
    }

    pub fn spoken_at(&self) -> Vec<(Duration, String)> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn speak(&self, text: &str) {
        let at = self.created.elapsed();
        self.spoken.lock().unwrap().push((at, text.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlarm {
    plays: Mutex<usize>,
}

impl RecordingAlarm {
    pub fn plays(&self) -> usize {
        *self.plays.lock().unwrap()
    }
}

impl AlarmPlayer for RecordingAlarm {
    fn play(&self) {
        *self.plays.lock().unwrap() += 1;
    }
}

/// State whose tick source is too slow to interfere with manual `tick_from` calls
pub fn test_state(
    initial_seconds: u64,
) -> (Arc<AppState>, Arc<RecordingAnnouncer>, Arc<RecordingAlarm>) {
    build(initial_seconds, Preferences::default(), Duration::from_secs(3600))
}

/// State ticking once per second, for tests running on paused tokio time
pub fn ticking_state(
    initial_seconds: u64,
    preferences: Preferences,
) -> (Arc<AppState>, Arc<RecordingAnnouncer>, Arc<RecordingAlarm>) {
    build(initial_seconds, preferences, Duration::from_secs(1))
}

fn build(
    initial_seconds: u64,
    preferences: Preferences,
    period: Duration,
) -> (Arc<AppState>, Arc<RecordingAnnouncer>, Arc<RecordingAlarm>) {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let alarm = Arc::new(RecordingAlarm::default());
    let services = Services {
        announcer: announcer.clone(),
        alarm: alarm.clone(),
    };
    let state = AppState::new(
        0,
        "127.0.0.1".to_string(),
        initial_seconds,
        PreferenceStore::in_memory(preferences),
        services,
    )
    .with_tick_period(period);
    (Arc::new(state), announcer, alarm)
}
