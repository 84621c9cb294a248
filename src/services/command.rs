//! Launching configured external commands

use std::{process::Stdio, sync::Mutex};
use tokio::process::{Child, Command};
use tracing::debug;

/// A program plus fixed arguments, parsed from a whitespace-separated string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    /// Parse `"espeak -v en"` style command lines. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// Build the process with `extra` appended after the fixed arguments
    pub fn command(&self, extra: Option<&str>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(extra) = extra {
            command.arg(extra);
        }
        command
    }
}

/// Holds at most one running child; starting a new one kills the previous
#[derive(Debug, Default)]
pub struct ExclusiveProcess {
    current: Mutex<Option<Child>>,
}

impl ExclusiveProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any previous child and spawn `command` in its place
    pub fn replace(&self, command: &ExternalCommand, extra: Option<&str>) -> Result<(), String> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| format!("Failed to lock process slot: {}", e))?;

        if let Some(mut previous) = current.take() {
            if let Err(e) = previous.start_kill() {
                debug!("Previous {} already exited: {}", command.program, e);
            }
        }

        let child = command
            .command(extra)
            .spawn()
            .map_err(|e| format!("Failed to launch {}: {}", command.program, e))?;
        *current = Some(child);
        Ok(())
    }
}
