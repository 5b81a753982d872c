use crate::error::{Error, Result};
use crate::runtime::{ProcessController, ProcessState};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// State the operator last asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    Running,
    Stopped,
}

/// Bookkeeping for the single managed data-store process.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedProcess {
    pub name: String,
    pub desired: Option<DesiredState>,
    pub observed: ProcessState,
    pub last_health: Option<bool>,
}

/// Owns the managed process record and issues lifecycle commands through a
/// [`ProcessController`].
///
/// The record lock is never held across an await.
pub struct Supervisor<C> {
    controller: Arc<C>,
    process: Mutex<ManagedProcess>,
}

impl<C: ProcessController> Supervisor<C> {
    pub fn new(controller: Arc<C>) -> Self {
        let process = ManagedProcess {
            name: controller.name().to_string(),
            desired: None,
            observed: ProcessState::Stopped,
            last_health: None,
        };
        Self {
            controller,
            process: Mutex::new(process),
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn name(&self) -> String {
        self.process.lock().name.clone()
    }

    /// Copy of the current process record.
    pub fn snapshot(&self) -> ManagedProcess {
        self.process.lock().clone()
    }

    /// Launch the process unless it is already running.
    ///
    /// Returns once the launch was issued; use the readiness gate to wait for
    /// the process to accept connections.
    pub async fn start(&self) -> Result<()> {
        self.process.lock().desired = Some(DesiredState::Running);

        if self.status().await? == ProcessState::Running {
            tracing::info!("Service '{}' is already running", self.controller.name());
            return Ok(());
        }

        tracing::info!("Starting service '{}'", self.controller.name());
        self.controller.start().await?;
        let mut process = self.process.lock();
        process.observed = ProcessState::Running;
        process.last_health = None;
        Ok(())
    }

    /// Signal the process to halt gracefully.
    pub async fn stop(&self) -> Result<()> {
        self.process.lock().desired = Some(DesiredState::Stopped);
        tracing::info!("Stopping service '{}'", self.controller.name());
        self.controller.stop().await?;
        self.mark_stopped();
        Ok(())
    }

    /// Stop the process and delete all of its persisted data.
    pub async fn teardown(&self) -> Result<()> {
        self.process.lock().desired = Some(DesiredState::Stopped);
        tracing::warn!(
            "Removing service '{}' together with its data volumes",
            self.controller.name()
        );
        self.controller.purge().await?;
        self.mark_stopped();
        Ok(())
    }

    /// Query the runtime for the current state and record it.
    pub async fn status(&self) -> Result<ProcessState> {
        let state = self.controller.status().await?;
        let mut process = self.process.lock();
        process.observed = state;
        if state == ProcessState::Stopped {
            process.last_health = None;
        }
        Ok(state)
    }

    /// Run one health probe and record the result.
    pub async fn healthcheck(&self) -> Result<bool> {
        let healthy = self.controller.healthcheck().await?;
        self.process.lock().last_health = Some(healthy);
        Ok(healthy)
    }

    /// Fail with [`Error::ProcessNotRunning`] unless the runtime reports the
    /// process as running.
    pub async fn require_running(&self) -> Result<()> {
        match self.status().await? {
            ProcessState::Running => Ok(()),
            ProcessState::Stopped => Err(Error::ProcessNotRunning(self.name())),
        }
    }

    pub async fn logs(&self, tail: Option<usize>, follow: bool) -> Result<()> {
        self.controller.logs(tail, follow).await
    }

    fn mark_stopped(&self) {
        let mut process = self.process.lock();
        process.observed = ProcessState::Stopped;
        process.last_health = None;
    }
}
