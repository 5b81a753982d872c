use super::Supervisor;
use crate::config::ReadinessSettings;
use crate::error::{Error, Result};
use crate::runtime::ProcessController;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};

/// Least time a single probe gets, even when the deadline has already passed.
const MIN_PROBE_TIME: Duration = Duration::from_millis(10);

/// Blocks dependent operations until the managed process reports healthy.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessGate {
    settings: ReadinessSettings,
}

impl ReadinessGate {
    pub fn new(settings: ReadinessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> ReadinessSettings {
        self.settings
    }

    /// Poll with the configured timeout and interval.
    pub async fn wait<C: ProcessController>(&self, supervisor: &Supervisor<C>) -> Result<Duration> {
        wait_ready(supervisor, self.settings.timeout, self.settings.interval).await
    }
}

/// Poll the health probe every `interval` until it passes or `timeout` elapses.
///
/// The probe always runs at least once, so a zero timeout succeeds only if the
/// process is already healthy. Each probe is cut off at the deadline and then
/// counts as "not yet". Returns the time spent waiting. An unreachable runtime
/// aborts the wait immediately; other probe errors count as "not yet".
pub async fn wait_ready<C: ProcessController>(
    supervisor: &Supervisor<C>,
    timeout: Duration,
    interval: Duration,
) -> Result<Duration> {
    let start = Instant::now();
    let deadline = start + timeout;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let probe_deadline = deadline.max(Instant::now() + MIN_PROBE_TIME);
        let probe = match timeout_at(probe_deadline, supervisor.healthcheck()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(
                    "Service '{}' probe {} did not answer before the deadline",
                    supervisor.name(),
                    attempt
                );
                Ok(false)
            }
        };
        match probe {
            Ok(true) => {
                tracing::info!(
                    "Service '{}' is ready after {} probe(s) ({:?})",
                    supervisor.name(),
                    attempt,
                    start.elapsed()
                );
                return Ok(start.elapsed());
            }
            Ok(false) => {
                tracing::debug!("Service '{}' not ready yet (probe {})", supervisor.name(), attempt);
            }
            Err(e @ Error::EnvironmentUnavailable(_)) => return Err(e),
            Err(e) => {
                tracing::debug!(
                    "Service '{}' probe {} failed: {}, retrying",
                    supervisor.name(),
                    attempt,
                    e
                );
            }
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(
                "Service '{}' did not become ready within {:?}",
                supervisor.name(),
                timeout
            );
            return Err(Error::ReadinessTimeout {
                service: supervisor.name(),
                timeout,
            });
        }

        sleep(interval.min(deadline - now)).await;
    }
}
