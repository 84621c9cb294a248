//! Spoken announcements

use tracing::{info, warn};

use super::{command::ExclusiveProcess, Announcer, ExternalCommand};

/// Speaks through an external text-to-speech command such as `espeak`.
///
/// The utterance is passed as the final argument. A new utterance kills the
/// one still being spoken. Without a command, utterances are only logged.
#[derive(Debug, Default)]
pub struct SpeechAnnouncer {
    command: Option<ExternalCommand>,
    process: ExclusiveProcess,
}

impl SpeechAnnouncer {
    pub fn new(command: Option<ExternalCommand>) -> Self {
        Self {
            command,
            process: ExclusiveProcess::new(),
        }
    }
}

impl Announcer for SpeechAnnouncer {
    fn speak(&self, text: &str) {
        info!("Announcement: {}", text);
        let Some(command) = &self.command else {
            return;
        };
        if let Err(e) = self.process.replace(command, Some(text)) {
            warn!("Speech unavailable: {}", e);
        }
    }
}
