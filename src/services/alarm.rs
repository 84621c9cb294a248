//! Completion alarm

use tracing::{info, warn};

use super::{command::ExclusiveProcess, AlarmPlayer, ExternalCommand};

/// Plays the alarm through an external player command such as `paplay`.
///
/// Each play starts from the beginning by relaunching the player.
#[derive(Debug, Default)]
pub struct CommandAlarm {
    command: Option<ExternalCommand>,
    process: ExclusiveProcess,
}

impl CommandAlarm {
    pub fn new(command: Option<ExternalCommand>) -> Self {
        Self {
            command,
            process: ExclusiveProcess::new(),
        }
    }
}

impl AlarmPlayer for CommandAlarm {
    fn play(&self) {
        let Some(command) = &self.command else {
            info!("Alarm (no player configured)");
            return;
        };
        info!("Playing alarm");
        if let Err(e) = self.process.replace(command, None) {
            warn!("Alarm playback failed: {}", e);
        }
    }
}
