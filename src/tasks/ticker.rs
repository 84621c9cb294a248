//! Periodic tick source for a running countdown

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error};

use crate::state::AppState;

/// Handle to a spawned tick source. Cancelling aborts the task.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        debug!("Cancelling tick source #{}", self.generation);
        self.task.abort();
    }
}

/// Spawn a task calling [`AppState::tick_from`] every `period`, first one
/// `period` after spawning, until the engine leaves the running status
pub fn spawn_ticker(state: Arc<AppState>, generation: u64, period: Duration) -> TickHandle {
    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;

            match state.tick_from(generation) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Tick source #{} finished", generation);
                    break;
                }
                Err(e) => {
                    error!("Tick source #{} stopped: {}", generation, e);
                    break;
                }
            }
        }
    });

    TickHandle { generation, task }
}
