//! State management module
//!
//! This module contains the countdown engine, its presentation snapshot,
//! persisted preferences and the shared application state hosting them.

pub mod app_state;
pub mod display;
pub mod preferences;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Services, Transition};
pub use display::{DisplaySnapshot, VisualState};
pub use preferences::{PreferenceStore, Preferences, PreferencesPatch};
pub use timer_state::{TimerError, TimerEvent, TimerState, TimerStatus};
