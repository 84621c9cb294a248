//! Countdown Timer - A countdown engine served over HTTP
//!
//! This library provides a pausable, resettable countdown with spoken
//! milestones, a completion alarm, persisted preferences and a display
//! snapshot stream that normal and fullscreen clients render from.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
