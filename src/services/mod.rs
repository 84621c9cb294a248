//! External collaborator services
//!
//! The engine never calls these directly. The announcement task turns engine
//! events into utterances and alarm plays; failures stay inside this module.

pub mod alarm;
pub mod command;
pub mod speech;

// Re-export main types
pub use alarm::CommandAlarm;
pub use command::ExternalCommand;
pub use speech::SpeechAnnouncer;

/// Speaks utterances, cancelling whatever is still being spoken
pub trait Announcer: Send + Sync {
    fn speak(&self, text: &str);
}

/// Plays the completion alarm from the start
pub trait AlarmPlayer: Send + Sync {
    fn play(&self);
}
