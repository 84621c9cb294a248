//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::{
    services::ExternalCommand,
    state::timer_state::parse_time_input,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown-timer")]
#[command(about = "A countdown timer server with spoken milestones and an alarm")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial countdown duration (MM:SS, or minutes)
    #[arg(short, long, default_value = "03:00")]
    pub duration: String,

    /// File holding the sound and alarm preferences
    #[arg(long, default_value = "countdown-preferences.json")]
    pub preferences: PathBuf,

    /// Text-to-speech command; the utterance is appended as the last argument
    #[arg(long)]
    pub speech_command: Option<String>,

    /// Command playing the alarm sound from the start
    #[arg(long)]
    pub alarm_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial duration in seconds
    pub fn initial_seconds(&self) -> u64 {
        let (minutes, seconds) = parse_time_input(&self.duration);
        minutes * 60 + seconds
    }

    pub fn speech(&self) -> Option<ExternalCommand> {
        self.speech_command.as_deref().and_then(ExternalCommand::parse)
    }

    pub fn alarm(&self) -> Option<ExternalCommand> {
        self.alarm_command.as_deref().and_then(ExternalCommand::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["countdown-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.initial_seconds(), 180);
        assert_eq!(config.log_level(), "info");
        assert!(config.speech().is_none());
        assert!(config.alarm().is_none());
    }

    #[test]
    fn parses_duration_and_commands() {
        let config = Config::try_parse_from([
            "countdown-timer",
            "--duration",
            "5:30",
            "--speech-command",
            "espeak -v en",
            "--alarm-command",
            "paplay alarm.oga",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.initial_seconds(), 330);
        assert_eq!(config.speech().unwrap().args, vec!["-v", "en"]);
        assert_eq!(config.alarm().unwrap().program, "paplay");
        assert_eq!(config.log_level(), "debug");
    }
}
