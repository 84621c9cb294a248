//! Persisted user preferences (sound and alarm toggles)

use std::{path::PathBuf, sync::Mutex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while persisting preferences
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to lock preferences: {0}")]
    Lock(String),
}

/// User preference flags, stored under fixed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Spoken announcements (off unless the user opts in)
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
    /// Alarm on completion
    #[serde(rename = "alarmEnabled")]
    pub alarm_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: false,
            alarm_enabled: true,
        }
    }
}

/// Partial update of [`Preferences`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PreferencesPatch {
    #[serde(default, alias = "soundEnabled")]
    pub sound_enabled: Option<bool>,
    #[serde(default, alias = "alarmEnabled")]
    pub alarm_enabled: Option<bool>,
}

impl Preferences {
    /// Apply a patch, returning the updated flags
    pub fn apply(mut self, patch: PreferencesPatch) -> Self {
        if let Some(sound) = patch.sound_enabled {
            self.sound_enabled = sound;
        }
        if let Some(alarm) = patch.alarm_enabled {
            self.alarm_enabled = alarm;
        }
        self
    }
}

/// Preference flags backed by a JSON file
#[derive(Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    current: Mutex<Preferences>,
    /// Held from the in-memory update through the file write, so the file
    /// always ends up with the latest flags
    writer: tokio::sync::Mutex<()>,
}

impl PreferenceStore {
    /// In-memory store that never touches disk
    pub fn in_memory(preferences: Preferences) -> Self {
        Self {
            path: None,
            current: Mutex::new(preferences),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    /// Load preferences from `path`, falling back to defaults when the file
    /// is missing or unreadable
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let preferences = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<Preferences>(&contents) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    prefs
                }
                Err(e) => {
                    warn!("Ignoring corrupt preferences file {}: {}", path.display(), e);
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", path.display());
                Preferences::default()
            }
            Err(e) => {
                warn!("Failed to read preferences {}: {}", path.display(), e);
                Preferences::default()
            }
        };

        Self {
            path: Some(path),
            current: Mutex::new(preferences),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    /// Current flags
    pub fn get(&self) -> Result<Preferences, PreferenceError> {
        self.current
            .lock()
            .map(|prefs| *prefs)
            .map_err(|e| PreferenceError::Lock(e.to_string()))
    }

    /// Apply `patch` in memory and persist the result.
    ///
    /// Returns the previous and updated flags. The in-memory value is kept
    /// even when writing to disk fails.
    pub async fn update(
        &self,
        patch: PreferencesPatch,
    ) -> Result<(Preferences, Preferences), PreferenceError> {
        let _writer = self.writer.lock().await;

        let (previous, updated) = {
            let mut current = self
                .current
                .lock()
                .map_err(|e| PreferenceError::Lock(e.to_string()))?;
            let previous = *current;
            *current = previous.apply(patch);
            (previous, *current)
        };

        if let Err(e) = self.save(&updated).await {
            warn!("Preferences changed but were not persisted: {}", e);
        }

        Ok((previous, updated))
    }

    /// Write to a sibling temp file, then rename over the target
    async fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(preferences)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!("Preferences saved to {}", path.display());
        Ok(())
    }
}
