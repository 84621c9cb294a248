//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    display::DisplaySnapshot,
    preferences::{PreferenceStore, Preferences, PreferencesPatch},
    timer_state::{parse_time_input, TimerError, TimerEvent, TimerState},
};
use crate::{
    error::AppError,
    services::{AlarmPlayer, Announcer},
    tasks::ticker::{spawn_ticker, TickHandle},
};

/// Utterance spoken when sound gets switched on
pub const SOUND_ON_UTTERANCE: &str = "Sound on";

/// Collaborators the engine's events are delivered to
#[derive(Clone)]
pub struct Services {
    pub announcer: Arc<dyn Announcer>,
    pub alarm: Arc<dyn AlarmPlayer>,
}

/// Result of an engine operation
#[derive(Debug, Clone)]
pub struct Transition {
    /// Display state after the operation
    pub snapshot: DisplaySnapshot,
    /// Events the operation emitted, in order
    pub events: Vec<TimerEvent>,
    /// False when the operation was ignored in the current status
    pub applied: bool,
}

/// Engine plus its tick source, guarded together so every transition is atomic
#[derive(Debug)]
struct Engine {
    timer: TimerState,
    ticker: Option<TickHandle>,
    generation: u64,
    fullscreen: bool,
}

/// Shared application state hosting the countdown engine
pub struct AppState {
    engine: Mutex<Engine>,
    tick_period: Duration,
    /// Persisted sound/alarm flags
    pub preferences: PreferenceStore,
    /// Speech and alarm collaborators
    pub services: Services,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Channel for engine events (announcements, alarm, SSE clients)
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Channel for display snapshots
    pub display_tx: watch::Sender<DisplaySnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplaySnapshot>,
}

impl AppState {
    /// Create the state with an idle timer set to `initial_seconds`
    pub fn new(
        port: u16,
        host: String,
        initial_seconds: u64,
        preferences: PreferenceStore,
        services: Services,
    ) -> Self {
        let timer = TimerState::new(initial_seconds);
        let (event_tx, _) = broadcast::channel(100);
        let (display_tx, display_rx) = watch::channel(DisplaySnapshot::new(&timer, false));

        Self {
            engine: Mutex::new(Engine {
                timer,
                ticker: None,
                generation: 0,
                fullscreen: false,
            }),
            tick_period: Duration::from_secs(1),
            preferences,
            services,
            start_time: Instant::now(),
            port,
            host,
            event_tx,
            display_tx,
            _display_rx: display_rx,
        }
    }

    /// Override the one-second tick cadence
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, Engine>, AppError> {
        self.engine
            .lock()
            .map_err(|e| AppError::Lock(e.to_string()))
    }

    /// Apply `op` to the timer, reconcile the tick source and notify subscribers
    fn transition<F>(self: &Arc<Self>, action: &str, op: F) -> Result<Transition, AppError>
    where
        F: FnOnce(&mut TimerState) -> Result<(bool, Vec<TimerEvent>), TimerError>,
    {
        let mut engine = self.lock_engine()?;

        let (applied, events) = match op(&mut engine.timer) {
            Ok(outcome) => outcome,
            Err(e) => {
                info!("{} rejected: {}", action, e);
                return Err(e.into());
            }
        };
        if applied {
            debug!("{} -> {:?}", action, engine.timer);
        } else {
            debug!("{} ignored while {:?}", action, engine.timer.status());
        }

        self.sync_tick_source(&mut engine);
        let snapshot = self.publish(&engine, &events);

        Ok(Transition {
            snapshot,
            events,
            applied,
        })
    }

    /// Keep exactly one tick source alive while running and none otherwise
    fn sync_tick_source(self: &Arc<Self>, engine: &mut Engine) {
        if engine.timer.is_running() {
            if engine.ticker.is_none() {
                engine.generation += 1;
                debug!("Starting tick source #{}", engine.generation);
                engine.ticker = Some(spawn_ticker(
                    Arc::clone(self),
                    engine.generation,
                    self.tick_period,
                ));
            }
        } else if let Some(handle) = engine.ticker.take() {
            handle.cancel();
        }
    }

    /// Send events then the new snapshot; called with the engine locked so
    /// subscribers observe changes in order
    fn publish(&self, engine: &Engine, events: &[TimerEvent]) -> DisplaySnapshot {
        for event in events {
            if self.event_tx.send(event.clone()).is_err() {
                debug!("No event subscribers for {:?}", event);
            }
        }

        let snapshot = DisplaySnapshot::new(&engine.timer, engine.fullscreen);
        if let Err(e) = self.display_tx.send(snapshot.clone()) {
            warn!("Failed to send display update: {}", e);
        }
        snapshot
    }

    /// Set the duration from minutes and seconds; ignored while running or paused
    pub fn configure(self: &Arc<Self>, minutes: i64, seconds: i64) -> Result<Transition, AppError> {
        self.transition("configure", |timer| Ok((timer.configure(minutes, seconds), Vec::new())))
    }

    /// Set the duration from free-form `MM:SS` text
    pub fn configure_text(self: &Arc<Self>, input: &str) -> Result<Transition, AppError> {
        let (minutes, seconds) = parse_time_input(input);
        self.configure(minutes as i64, seconds as i64)
    }

    /// Set the duration to a preset number of minutes
    pub fn configure_preset(self: &Arc<Self>, minutes: u64) -> Result<Transition, AppError> {
        self.transition("preset", |timer| Ok((timer.configure_preset(minutes), Vec::new())))
    }

    /// Step the configured duration up or down
    pub fn adjust(self: &Arc<Self>, delta_seconds: i64) -> Result<Transition, AppError> {
        self.transition("adjust", |timer| Ok((timer.adjust(delta_seconds), Vec::new())))
    }

    /// Start or resume the countdown
    pub fn start(self: &Arc<Self>) -> Result<Transition, AppError> {
        self.transition("start", |timer| {
            let events = timer.start()?;
            Ok((!events.is_empty(), events))
        })
    }

    /// Pause the countdown
    pub fn pause(self: &Arc<Self>) -> Result<Transition, AppError> {
        self.transition("pause", |timer| {
            let events = timer.pause();
            Ok((!events.is_empty(), events))
        })
    }

    /// Pause when running, otherwise start or resume
    pub fn toggle(self: &Arc<Self>) -> Result<Transition, AppError> {
        self.transition("toggle", |timer| {
            let events = timer.toggle()?;
            Ok((!events.is_empty(), events))
        })
    }

    /// Stop and restore the configured duration
    pub fn reset(self: &Arc<Self>) -> Result<Transition, AppError> {
        self.transition("reset", |timer| Ok((true, timer.reset())))
    }

    /// Advance the countdown on behalf of the tick source `generation`.
    ///
    /// Returns whether that tick source should keep running. Ticks from a
    /// source that has since been replaced or cancelled are ignored.
    pub fn tick_from(self: &Arc<Self>, generation: u64) -> Result<bool, AppError> {
        let mut engine = self.lock_engine()?;

        let current = engine.ticker.as_ref().map(TickHandle::generation);
        if current != Some(generation) {
            debug!("Ignoring tick from stale source #{}", generation);
            return Ok(false);
        }

        let events = engine.timer.tick();
        if events.contains(&TimerEvent::Finished) {
            info!("Countdown finished");
        }

        self.sync_tick_source(&mut engine);
        self.publish(&engine, &events);

        Ok(engine.timer.is_running())
    }

    /// Enter (`Some(true)`), exit (`Some(false)`) or toggle (`None`) fullscreen
    /// mode. The countdown itself is unaffected.
    pub fn set_fullscreen(&self, enabled: Option<bool>) -> Result<DisplaySnapshot, AppError> {
        let mut engine = self.lock_engine()?;
        engine.fullscreen = enabled.unwrap_or(!engine.fullscreen);
        info!("Fullscreen mode {}", if engine.fullscreen { "entered" } else { "exited" });
        Ok(self.publish(&engine, &[]))
    }

    /// Current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, AppError> {
        self.lock_engine().map(|engine| engine.timer.clone())
    }

    /// Current display snapshot
    pub fn get_snapshot(&self) -> Result<DisplaySnapshot, AppError> {
        self.lock_engine()
            .map(|engine| DisplaySnapshot::new(&engine.timer, engine.fullscreen))
    }

    /// Whether a tick source is currently alive
    pub fn has_tick_source(&self) -> Result<bool, AppError> {
        self.lock_engine().map(|engine| engine.ticker.is_some())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_tx.subscribe()
    }

    pub fn get_preferences(&self) -> Result<Preferences, AppError> {
        Ok(self.preferences.get()?)
    }

    /// Update preference flags. Switching sound on is confirmed out loud.
    pub async fn update_preferences(&self, patch: PreferencesPatch) -> Result<Preferences, AppError> {
        let (previous, updated) = self.preferences.update(patch).await?;
        info!(
            "Preferences: sound={} alarm={}",
            updated.sound_enabled, updated.alarm_enabled
        );

        if updated.sound_enabled && !previous.sound_enabled {
            self.services.announcer.speak(SOUND_ON_UTTERANCE);
        }
        Ok(updated)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
