//! Start/stop shim around the poll loop
//!
//! A service manager only needs two hooks: one that starts work without blocking and
//! one that stops it. [`PollService`] adapts a [`Poller`] to that shape.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::poller::Poller;

/// Hooks invoked by whatever supervises the process
#[async_trait]
pub trait Lifecycle: Send {
    /// Start work in the background and return promptly
    async fn on_start(&mut self) -> Result<()>;

    /// Stop scheduling new work and return promptly
    async fn on_stop(&mut self) -> Result<()>;
}

enum State {
    Idle,
    Running {
        stop_tx: oneshot::Sender<()>,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// Runs a [`Poller`] between `on_start` and `on_stop`
pub struct PollService {
    poller: Arc<Poller>,
    state: State,
}

impl PollService {
    /// Wrap a poller; nothing runs until `on_start`
    pub fn new(poller: Poller) -> Self {
        Self {
            poller: Arc::new(poller),
            state: State::Idle,
        }
    }

    /// Whether the poll loop is currently scheduling ticks
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }
}

#[async_trait]
impl Lifecycle for PollService {
    async fn on_start(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {}
            State::Running { .. } => return Err(Error::lifecycle("service is already running")),
            State::Stopped => return Err(Error::lifecycle("service has already been stopped")),
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(Arc::clone(&self.poller).run(stop_rx));
        self.state = State::Running { stop_tx, handle };

        info!("Service started");
        Ok(())
    }

    async fn on_stop(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Running { stop_tx, handle } => {
                // The loop may already have exited if its task panicked
                let _ = stop_tx.send(());
                if let Err(e) = handle.await {
                    warn!(error = %e, "Poll loop task ended abnormally");
                }
                info!("Service stopped");
            }
            State::Idle => {
                debug!("Stop requested before start");
                self.state = State::Idle;
            }
            State::Stopped => debug!("Service already stopped"),
        }
        Ok(())
    }
}
