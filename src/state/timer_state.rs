//! Countdown engine: timer state and its transitions
//!
//! Every transition mutates the state in place and returns the events it
//! produced. Nothing here touches a clock; the tick source lives in
//! `tasks::ticker` and calls [`TimerState::tick`] once per elapsed second.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest minutes value accepted by the input field
pub const MAX_MINUTES: i64 = 999;
/// Largest configurable duration (999:59)
pub const MAX_TOTAL_SECONDS: u64 = (MAX_MINUTES as u64) * 60 + 59;
/// Preset durations offered to clients, in minutes
pub const PRESET_MINUTES: [u64; 5] = [1, 3, 5, 10, 15];

/// Errors raised by the countdown engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Start was requested without a positive duration
    #[error("Please set a time")]
    NoDuration,
}

/// Timer lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Notification emitted by an engine transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started { remaining_seconds: u64 },
    Paused,
    Reset,
    MinuteRemaining { minutes: u64 },
    SecondsCountdown { seconds: u64 },
    Finished,
}

impl TimerEvent {
    /// Event name used on the SSE stream
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Started { .. } => "started",
            TimerEvent::Paused => "paused",
            TimerEvent::Reset => "reset",
            TimerEvent::MinuteRemaining { .. } => "minute_remaining",
            TimerEvent::SecondsCountdown { .. } => "seconds_countdown",
            TimerEvent::Finished => "finished",
        }
    }
}

/// Label of the start/pause button for the current status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryAction {
    Start,
    Pause,
    Resume,
}

/// Countdown state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    configured_seconds: u64,
    remaining_seconds: u64,
    status: TimerStatus,
}

impl TimerState {
    /// Create an idle timer set to `seconds`, clamped to the maximum duration
    pub fn new(seconds: u64) -> Self {
        let configured = seconds.min(MAX_TOTAL_SECONDS);
        Self {
            configured_seconds: configured,
            remaining_seconds: configured,
            status: TimerStatus::Idle,
        }
    }

    pub fn configured_seconds(&self) -> u64 {
        self.configured_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Whether the configured duration may currently be edited
    pub fn accepts_configuration(&self) -> bool {
        matches!(self.status, TimerStatus::Idle | TimerStatus::Finished)
    }

    /// Set the duration from minutes and seconds.
    ///
    /// Seconds of 60 or more roll into minutes before clamping. Ignored
    /// unless the timer is idle or finished. Returns whether it applied.
    pub fn configure(&mut self, minutes: i64, seconds: i64) -> bool {
        if !self.accepts_configuration() {
            return false;
        }
        let (minutes, seconds) = normalize(minutes, seconds);
        self.set_configured(minutes * 60 + seconds);
        true
    }

    /// Set the duration to a whole number of minutes
    pub fn configure_preset(&mut self, minutes: u64) -> bool {
        self.configure(i64::try_from(minutes).unwrap_or(i64::MAX), 0)
    }

    /// Shift the configured duration by a signed number of seconds.
    ///
    /// Borrows and carries across the minute boundary, then clamps to
    /// `0..=999:59`. Same acceptance rule as [`TimerState::configure`].
    pub fn adjust(&mut self, delta_seconds: i64) -> bool {
        if !self.accepts_configuration() {
            return false;
        }
        let current = self.configured_seconds as i64;
        let target = current
            .saturating_add(delta_seconds)
            .clamp(0, MAX_TOTAL_SECONDS as i64);
        self.set_configured(target as u64);
        true
    }

    fn set_configured(&mut self, total: u64) {
        self.configured_seconds = total;
        self.remaining_seconds = total;
        self.status = TimerStatus::Idle;
    }

    /// Start, or resume when paused
    pub fn start(&mut self) -> Result<Vec<TimerEvent>, TimerError> {
        if self.configured_seconds == 0 {
            return Err(TimerError::NoDuration);
        }
        if self.is_running() {
            return Ok(Vec::new());
        }
        if self.status != TimerStatus::Paused {
            self.remaining_seconds = self.configured_seconds;
        }
        self.status = TimerStatus::Running;

        let remaining = self.remaining_seconds;
        let mut events = vec![TimerEvent::Started {
            remaining_seconds: remaining,
        }];
        // already inside the final countdown window: count the current second too
        if in_final_countdown(remaining) {
            events.push(TimerEvent::SecondsCountdown { seconds: remaining });
        }
        Ok(events)
    }

    /// Pause a running timer; a no-op in any other status
    pub fn pause(&mut self) -> Vec<TimerEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        self.status = TimerStatus::Paused;
        vec![TimerEvent::Paused]
    }

    /// Pause when running, otherwise start
    pub fn toggle(&mut self) -> Result<Vec<TimerEvent>, TimerError> {
        if self.is_running() {
            Ok(self.pause())
        } else {
            self.start()
        }
    }

    /// Return to idle with the full configured duration
    pub fn reset(&mut self) -> Vec<TimerEvent> {
        self.remaining_seconds = self.configured_seconds;
        self.status = TimerStatus::Idle;
        vec![TimerEvent::Reset]
    }

    /// Advance the countdown by one second. Ignored unless running.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if !self.is_running() {
            return Vec::new();
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        let remaining = self.remaining_seconds;
        let mut events = Vec::new();

        if remaining > 0 && remaining % 60 == 0 {
            events.push(TimerEvent::MinuteRemaining {
                minutes: remaining / 60,
            });
        }
        if in_final_countdown(remaining) {
            events.push(TimerEvent::SecondsCountdown { seconds: remaining });
        }
        if remaining == 0 {
            self.status = TimerStatus::Finished;
            events.push(TimerEvent::Finished);
        }

        events
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.status {
            TimerStatus::Running => PrimaryAction::Pause,
            TimerStatus::Paused => PrimaryAction::Resume,
            TimerStatus::Idle | TimerStatus::Finished => PrimaryAction::Start,
        }
    }

    /// Preset matching the configured duration, if any
    pub fn matching_preset(&self) -> Option<u64> {
        if self.configured_seconds % 60 != 0 {
            return None;
        }
        let minutes = self.configured_seconds / 60;
        PRESET_MINUTES.contains(&minutes).then_some(minutes)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(0)
    }
}

fn in_final_countdown(remaining: u64) -> bool {
    (1..=10).contains(&remaining)
}

/// Roll overflow seconds into minutes, then clamp both fields
fn normalize(minutes: i64, seconds: i64) -> (u64, u64) {
    let mut minutes = minutes;
    let mut seconds = seconds;
    if seconds >= 60 {
        minutes = minutes.saturating_add(seconds / 60);
        seconds %= 60;
    }
    (
        minutes.clamp(0, MAX_MINUTES) as u64,
        seconds.clamp(0, 59) as u64,
    )
}

/// Parse free-form `MM:SS` input.
///
/// Anything but digits and `:` is dropped. A single number means minutes.
/// Empty fields count as zero.
pub fn parse_time_input(input: &str) -> (u64, u64) {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let mut parts = cleaned.split(':');

    let minutes = parts.next().map(parse_digits).unwrap_or(0);
    let seconds = parts.next().map(parse_digits).unwrap_or(0);

    normalize(minutes, seconds)
}

fn parse_digits(digits: &str) -> i64 {
    if digits.is_empty() {
        return 0;
    }
    // only digits remain, so a failure means overflow
    digits.parse().unwrap_or(i64::MAX)
}

/// Render seconds as zero-padded `MM:SS`
pub fn format_time(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: i64, seconds: i64) -> TimerState {
        let mut timer = TimerState::default();
        timer.configure(minutes, seconds);
        timer.start().unwrap();
        timer
    }

    #[test]
    fn configure_rolls_overflow_seconds_into_minutes() {
        for m in [0i64, 1, 7, 500, 998, 999] {
            for s in 0i64..120 {
                let mut timer = TimerState::default();
                assert!(timer.configure(m, s));
                let minutes = (m + s / 60).min(999) as u64;
                let expected = minutes * 60 + (s % 60) as u64;
                assert_eq!(timer.configured_seconds(), expected, "m={m} s={s}");
                assert_eq!(timer.remaining_seconds(), expected);
                assert_eq!(timer.status(), TimerStatus::Idle);
            }
        }
    }

    #[test]
    fn configure_clamps_out_of_range_fields() {
        let mut timer = TimerState::default();
        timer.configure(-5, -3);
        assert_eq!(timer.configured_seconds(), 0);

        timer.configure(5000, 30);
        assert_eq!(timer.configured_seconds(), 999 * 60 + 30);
    }

    #[test]
    fn configure_is_ignored_while_running_or_paused() {
        let mut timer = running(1, 0);
        assert!(!timer.configure(5, 0));
        assert_eq!(timer.configured_seconds(), 60);

        timer.pause();
        assert!(!timer.adjust(30));
        assert_eq!(timer.configured_seconds(), 60);
        assert_eq!(timer.status(), TimerStatus::Paused);
    }

    #[test]
    fn configure_after_finish_returns_to_idle() {
        let mut timer = running(0, 1);
        timer.tick();
        assert_eq!(timer.status(), TimerStatus::Finished);

        assert!(timer.configure(0, 30));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer.remaining_seconds(), 30);
    }

    #[test]
    fn start_without_duration_is_rejected() {
        let mut timer = TimerState::default();
        assert_eq!(timer.start(), Err(TimerError::NoDuration));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(TimerError::NoDuration.to_string(), "Please set a time");
    }

    #[test]
    fn start_emits_started_with_remaining() {
        let mut timer = TimerState::default();
        timer.configure(2, 5);
        let events = timer.start().unwrap();
        assert_eq!(events, vec![TimerEvent::Started { remaining_seconds: 125 }]);
        assert!(timer.is_running());

        // already running
        assert!(timer.start().unwrap().is_empty());
    }

    #[test]
    fn pause_then_start_resumes_where_it_stopped() {
        let mut timer = running(1, 0);
        for _ in 0..17 {
            timer.tick();
        }
        assert_eq!(timer.pause(), vec![TimerEvent::Paused]);
        assert_eq!(timer.remaining_seconds(), 43);

        let events = timer.start().unwrap();
        assert_eq!(events, vec![TimerEvent::Started { remaining_seconds: 43 }]);
        assert_eq!(timer.remaining_seconds(), 43);
    }

    #[test]
    fn pause_outside_running_does_nothing() {
        let mut timer = TimerState::new(30);
        assert!(timer.pause().is_empty());
        assert_eq!(timer.status(), TimerStatus::Idle);
    }

    #[test]
    fn toggle_alternates_between_pause_and_resume() {
        let mut timer = TimerState::new(30);
        timer.toggle().unwrap();
        assert_eq!(timer.status(), TimerStatus::Running);
        timer.toggle().unwrap();
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.primary_action(), PrimaryAction::Resume);
        timer.toggle().unwrap();
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.primary_action(), PrimaryAction::Pause);
    }

    #[test]
    fn reset_restores_configured_duration_from_any_status() {
        let mut idle = TimerState::new(90);
        idle.reset();
        assert_eq!(idle.remaining_seconds(), 90);

        let mut run = running(1, 30);
        run.tick();
        run.reset();
        assert_eq!(run.remaining_seconds(), 90);
        assert_eq!(run.status(), TimerStatus::Idle);

        let mut paused = running(1, 30);
        paused.tick();
        paused.pause();
        assert_eq!(paused.reset(), vec![TimerEvent::Reset]);
        assert_eq!(paused.remaining_seconds(), 90);

        let mut finished = running(0, 2);
        finished.tick();
        finished.tick();
        finished.reset();
        assert_eq!(finished.remaining_seconds(), 2);
        assert_eq!(finished.status(), TimerStatus::Idle);
    }

    #[test]
    fn tick_outside_running_leaves_state_untouched() {
        let mut idle = TimerState::new(10);
        let before = idle.clone();
        assert!(idle.tick().is_empty());
        assert_eq!(idle, before);

        let mut paused = running(0, 10);
        paused.pause();
        let before = paused.clone();
        assert!(paused.tick().is_empty());
        assert_eq!(paused, before);
    }

    #[test]
    fn five_second_countdown_finishes_once() {
        let mut timer = TimerState::default();
        timer.configure(0, 5);
        let mut events = timer.start().unwrap();
        for _ in 0..5 {
            events.extend(timer.tick());
        }

        assert_eq!(timer.status(), TimerStatus::Finished);
        assert_eq!(timer.remaining_seconds(), 0);
        let counted: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::SecondsCountdown { seconds } => Some(*seconds),
                _ => None,
            })
            .collect();
        assert_eq!(counted, vec![5, 4, 3, 2, 1]);
        assert_eq!(events.iter().filter(|e| **e == TimerEvent::Finished).count(), 1);

        // finished timers ignore further ticks
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn two_minute_countdown_announces_the_last_minute_once() {
        let mut timer = running(2, 0);
        let mut events = Vec::new();
        for _ in 0..60 {
            events.extend(timer.tick());
        }
        assert_eq!(timer.remaining_seconds(), 60);
        assert_eq!(events, vec![TimerEvent::MinuteRemaining { minutes: 1 }]);
    }

    #[test]
    fn start_after_finish_runs_the_full_duration_again() {
        let mut timer = running(0, 1);
        timer.tick();
        let events = timer.start().unwrap();
        assert_eq!(
            events,
            vec![
                TimerEvent::Started { remaining_seconds: 1 },
                TimerEvent::SecondsCountdown { seconds: 1 },
            ]
        );
    }

    #[test]
    fn adjust_borrows_and_carries_across_minutes() {
        let mut timer = TimerState::default();
        timer.configure(2, 10);
        timer.adjust(-15);
        assert_eq!(timer.configured_seconds(), 115);
        timer.adjust(10);
        assert_eq!(timer.configured_seconds(), 125);
        timer.adjust(-10_000);
        assert_eq!(timer.configured_seconds(), 0);
        timer.adjust(i64::MAX);
        assert_eq!(timer.configured_seconds(), MAX_TOTAL_SECONDS);
    }

    #[test]
    fn presets_are_recognised() {
        let mut timer = TimerState::default();
        timer.configure_preset(5);
        assert_eq!(timer.configured_seconds(), 300);
        assert_eq!(timer.matching_preset(), Some(5));

        timer.configure(5, 1);
        assert_eq!(timer.matching_preset(), None);
        timer.configure(7, 0);
        assert_eq!(timer.matching_preset(), None);
    }

    #[test]
    fn parses_free_form_time_input() {
        assert_eq!(parse_time_input("05:30"), (5, 30));
        assert_eq!(parse_time_input("5"), (5, 0));
        assert_eq!(parse_time_input("1:90"), (2, 30));
        assert_eq!(parse_time_input(" 3m:07s "), (3, 7));
        assert_eq!(parse_time_input(":45"), (0, 45));
        assert_eq!(parse_time_input(""), (0, 0));
        assert_eq!(parse_time_input("abc"), (0, 0));
        assert_eq!(parse_time_input("1234:00"), (999, 0));
        assert_eq!(parse_time_input("99999999999999999999999"), (999, 0));
        assert_eq!(parse_time_input("1:2:3"), (1, 2));
    }

    #[test]
    fn formats_zero_padded_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(MAX_TOTAL_SECONDS), "999:59");
    }
}
