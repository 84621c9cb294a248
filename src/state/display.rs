//! Presentation snapshot pushed to display subscribers after every change

use serde::{Deserialize, Serialize};

use super::timer_state::{format_time, PrimaryAction, TimerState, TimerStatus};

/// Completion notice shown while the timer is finished
pub const COMPLETION_NOTICE: &str = "Time's up!";

/// Visual state class applied to the time display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    Running,
    Paused,
    Finished,
    None,
}

impl From<TimerStatus> for VisualState {
    fn from(status: TimerStatus) -> Self {
        match status {
            TimerStatus::Running => VisualState::Running,
            TimerStatus::Paused => VisualState::Paused,
            TimerStatus::Finished => VisualState::Finished,
            TimerStatus::Idle => VisualState::None,
        }
    }
}

/// Everything a display surface (normal or fullscreen) needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub remaining_seconds: u64,
    pub configured_seconds: u64,
    pub status: TimerStatus,
    /// `MM:SS`
    pub display: String,
    pub visual_state: VisualState,
    pub primary_action: PrimaryAction,
    pub active_preset: Option<u64>,
    pub fullscreen: bool,
    pub notice: Option<String>,
}

impl DisplaySnapshot {
    pub fn new(timer: &TimerState, fullscreen: bool) -> Self {
        let status = timer.status();
        Self {
            remaining_seconds: timer.remaining_seconds(),
            configured_seconds: timer.configured_seconds(),
            status,
            display: format_time(timer.remaining_seconds()),
            visual_state: status.into(),
            primary_action: timer.primary_action(),
            active_preset: timer.matching_preset(),
            fullscreen,
            notice: (status == TimerStatus::Finished).then(|| COMPLETION_NOTICE.to_string()),
        }
    }
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self::new(&TimerState::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_has_no_visual_class() {
        let timer = TimerState::new(185);
        let snapshot = DisplaySnapshot::new(&timer, false);
        assert_eq!(snapshot.display, "03:05");
        assert_eq!(snapshot.visual_state, VisualState::None);
        assert_eq!(snapshot.primary_action, PrimaryAction::Start);
        assert_eq!(snapshot.notice, None);
    }

    #[test]
    fn finished_snapshot_carries_notice() {
        let mut timer = TimerState::new(1);
        timer.start().unwrap();
        timer.tick();
        let snapshot = DisplaySnapshot::new(&timer, true);
        assert_eq!(snapshot.display, "00:00");
        assert_eq!(snapshot.visual_state, VisualState::Finished);
        assert_eq!(snapshot.notice.as_deref(), Some(COMPLETION_NOTICE));
        assert!(snapshot.fullscreen);
    }

    #[test]
    fn serializes_lowercase_states() {
        let mut timer = TimerState::new(60);
        timer.start().unwrap();
        let json = serde_json::to_value(DisplaySnapshot::new(&timer, false)).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["visual_state"], "running");
        assert_eq!(json["primary_action"], "pause");
        assert_eq!(json["active_preset"], 1);
    }
}
