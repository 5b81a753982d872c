//! Process-controller capability.
//!
//! Lifecycle logic talks to the managed database only through these traits.
//! [`ComposeController`] drives a Docker Compose service; [`MemoryController`]
//! keeps everything in memory for tests.

pub mod compose;
pub mod memory;

pub use compose::ComposeController;
pub use memory::MemoryController;

use crate::config::Credentials;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Observed state of the managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Stopped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "running"),
            ProcessState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Start/stop/inspect one data-store process.
///
/// Implementations report an unreachable runtime as
/// [`Error::EnvironmentUnavailable`](crate::Error::EnvironmentUnavailable).
#[async_trait]
pub trait ProcessController: Send + Sync {
    /// Identifier of the managed process (compose service, container name, ...).
    fn name(&self) -> &str;

    /// Issue the launch. Returns once launched, not once ready.
    async fn start(&self) -> Result<()>;

    /// Ask the process to halt gracefully. Persisted data is kept.
    async fn stop(&self) -> Result<()>;

    /// Stop the process and irrevocably delete its persisted data.
    async fn purge(&self) -> Result<()>;

    async fn status(&self) -> Result<ProcessState>;

    /// `Ok(true)` once the process accepts connections.
    async fn healthcheck(&self) -> Result<bool>;

    /// Print process logs to the terminal.
    async fn logs(&self, tail: Option<usize>, follow: bool) -> Result<()>;
}

/// Full logical export and import of the data-store contents.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn export(&self, credentials: &Credentials) -> Result<Vec<u8>>;

    /// Replace the current contents with `dump`. Destructive.
    async fn import(&self, credentials: &Credentials, dump: &[u8]) -> Result<()>;
}
