//! Application error type

use thiserror::Error;

use crate::state::{preferences::PreferenceError, TimerError};

/// Errors surfaced by [`crate::state::AppState`] operations
#[derive(Error, Debug)]
pub enum AppError {
    /// User-facing validation failure from the engine
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Preferences(#[from] PreferenceError),

    /// Request body or path the engine cannot act on
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to lock timer state: {0}")]
    Lock(String),
}
