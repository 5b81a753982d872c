//! In-memory process controller.
//!
//! Stands in for a real database in tests: the "contents" are a byte buffer,
//! readiness is reached after a configurable number of health polls, and the
//! runtime can be made unreachable.

use super::{DataStore, ProcessController, ProcessState};
use crate::config::Credentials;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug)]
struct MemoryState {
    reachable: bool,
    running: bool,
    polls_until_healthy: u32,
    polls_remaining: u32,
    contents: Vec<u8>,
    starts: usize,
    imports: usize,
    log_requests: Vec<(Option<usize>, bool)>,
}

#[derive(Debug)]
pub struct MemoryController {
    name: String,
    state: Mutex<MemoryState>,
}

impl MemoryController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState {
                reachable: true,
                running: false,
                polls_until_healthy: 0,
                polls_remaining: 0,
                contents: Vec::new(),
                starts: 0,
                imports: 0,
                log_requests: Vec::new(),
            }),
        }
    }

    /// Seed the store contents.
    pub fn with_contents(self, contents: impl Into<Vec<u8>>) -> Self {
        self.state.lock().contents = contents.into();
        self
    }

    /// Number of failed health polls after each start before reporting healthy.
    pub fn healthy_after(self, polls: u32) -> Self {
        self.state.lock().polls_until_healthy = polls;
        self
    }

    /// Begin in the running, healthy state.
    pub fn running(self) -> Self {
        {
            let mut state = self.state.lock();
            state.running = true;
            state.polls_remaining = 0;
        }
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    pub fn set_contents(&self, contents: impl Into<Vec<u8>>) {
        self.state.lock().contents = contents.into();
    }

    pub fn contents(&self) -> Vec<u8> {
        self.state.lock().contents.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// How many times a launch was actually issued.
    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }

    pub fn import_count(&self) -> usize {
        self.state.lock().imports
    }

    pub fn log_requests(&self) -> Vec<(Option<usize>, bool)> {
        self.state.lock().log_requests.clone()
    }

    fn ensure_reachable(&self, state: &MemoryState) -> Result<()> {
        if state.reachable {
            Ok(())
        } else {
            Err(Error::EnvironmentUnavailable(format!(
                "in-memory runtime for '{}' is offline",
                self.name
            )))
        }
    }
}

#[async_trait]
impl ProcessController for MemoryController {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        if !state.running {
            state.running = true;
            state.polls_remaining = state.polls_until_healthy;
            state.starts += 1;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        state.running = false;
        Ok(())
    }

    async fn purge(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        state.running = false;
        state.contents.clear();
        Ok(())
    }

    async fn status(&self) -> Result<ProcessState> {
        let state = self.state.lock();
        self.ensure_reachable(&state)?;
        Ok(if state.running {
            ProcessState::Running
        } else {
            ProcessState::Stopped
        })
    }

    async fn healthcheck(&self) -> Result<bool> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        if !state.running {
            return Ok(false);
        }
        if state.polls_remaining > 0 {
            state.polls_remaining -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn logs(&self, tail: Option<usize>, follow: bool) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        state.log_requests.push((tail, follow));
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryController {
    async fn export(&self, _credentials: &Credentials) -> Result<Vec<u8>> {
        let state = self.state.lock();
        self.ensure_reachable(&state)?;
        if !state.running {
            return Err(Error::ProcessNotRunning(self.name.clone()));
        }
        Ok(state.contents.clone())
    }

    async fn import(&self, _credentials: &Credentials, dump: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_reachable(&state)?;
        if !state.running {
            return Err(Error::ProcessNotRunning(self.name.clone()));
        }
        state.contents = dump.to_vec();
        state.imports += 1;
        Ok(())
    }
}
