//! Background tasks module
//!
//! This module contains the tick source driving the countdown and the task
//! delivering engine events to the speech and alarm services.

pub mod announcements;
pub mod ticker;

// Re-export main functions
pub use announcements::{announcement_task, utterance};
pub use ticker::{spawn_ticker, TickHandle};
