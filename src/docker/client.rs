//! Centralized Docker CLI client.
//!
//! All Docker CLI interactions go through `DockerClient`, which provides
//! consistent timeout handling, error mapping to [`DockerError`], and a single
//! point where `Command::new("docker")` is constructed.

use super::DockerError;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Client for one Docker Compose project.
///
/// Every compose subcommand is issued as `docker compose -f <file> ...` so the
/// project resolves the same way regardless of the caller's working directory.
#[derive(Debug, Clone)]
pub struct DockerClient {
    compose_file: String,
}

impl DockerClient {
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        DockerClient {
            compose_file: compose_file.into().to_string_lossy().into_owned(),
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn compose_args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = vec!["compose", "-f", self.compose_file.as_str()];
        full.extend_from_slice(args);
        full
    }

    fn command_string(args: &[&str]) -> String {
        format!("docker {}", args.join(" "))
    }

    /// Run a docker command with a timeout, returning raw Output.
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, DockerError> {
        self.run_with_env(args, &[], timeout).await
    }

    /// Like [`run`](Self::run), with extra variables in the docker CLI's own
    /// environment. Values never appear in the command line or error text.
    async fn run_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Output, DockerError> {
        let cmd_str = Self::command_string(args);
        tracing::debug!("Running: {}", cmd_str);

        let result = tokio::time::timeout(
            timeout,
            tokio::process::Command::new("docker")
                .args(args)
                .envs(env.iter().copied())
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(DockerError::exec_failed(cmd_str, e)),
            Err(_) => Err(DockerError::timeout(cmd_str, timeout)),
        }
    }

    /// Run a compose command, returning Output only if exit 0.
    async fn compose_success(
        &self,
        service: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, DockerError> {
        let full = self.compose_args(args);
        let output = self.run(&full, timeout).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(DockerError::failed(Self::command_string(&full), service, &output))
        }
    }

    // ========================================================================
    // Service lifecycle
    // ========================================================================

    /// Create and start the service container in the background.
    pub async fn up(&self, service: &str, timeout: Duration) -> Result<(), DockerError> {
        self.compose_success(service, &["up", "-d", service], timeout)
            .await
            .map(|_| ())
    }

    /// Stop the service container gracefully, keeping it and its volumes.
    pub async fn stop(&self, service: &str, timeout: Duration) -> Result<(), DockerError> {
        self.compose_success(service, &["stop", service], timeout)
            .await
            .map(|_| ())
    }

    /// Remove the project's containers together with their named volumes.
    pub async fn down_volumes(&self, service: &str, timeout: Duration) -> Result<(), DockerError> {
        self.compose_success(service, &["down", "-v", "--remove-orphans"], timeout)
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// State string of the service container (`running`, `exited`, ...).
    ///
    /// Returns `None` when compose knows of no container for the service.
    pub async fn service_state(
        &self,
        service: &str,
        timeout: Duration,
    ) -> Result<Option<String>, DockerError> {
        let output = self
            .compose_success(
                service,
                &["ps", "-a", "--format", "{{.State}}", service],
                timeout,
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string))
    }

    // ========================================================================
    // Exec / Logs
    // ========================================================================

    /// `compose exec -T` arguments. Each `env` key is forwarded by name with
    /// `-e KEY`, so docker reads the value from its own environment.
    fn exec_args<'a>(service: &'a str, env: &[(&'a str, &str)], cmd: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec!["exec", "-T"];
        for &(key, _) in env {
            args.push("-e");
            args.push(key);
        }
        args.push(service);
        args.extend_from_slice(cmd);
        args
    }

    /// Run a command inside the service container without a TTY.
    pub async fn exec(
        &self,
        service: &str,
        env: &[(&str, &str)],
        cmd: &[&str],
        timeout: Duration,
    ) -> Result<Output, DockerError> {
        let args = Self::exec_args(service, env, cmd);
        let full = self.compose_args(&args);
        self.run_with_env(&full, env, timeout).await
    }

    /// Run a command inside the service container, feeding `input` on stdin.
    pub async fn exec_with_stdin(
        &self,
        service: &str,
        env: &[(&str, &str)],
        cmd: &[&str],
        input: &[u8],
        timeout: Duration,
    ) -> Result<Output, DockerError> {
        let args = Self::exec_args(service, env, cmd);
        let full = self.compose_args(&args);
        let cmd_str = Self::command_string(&full);
        tracing::debug!("Running with {} bytes on stdin: {}", input.len(), cmd_str);

        let mut child = tokio::process::Command::new("docker")
            .args(&full)
            .envs(env.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DockerError::exec_failed(&cmd_str, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DockerError::cmd_failed(&cmd_str, "stdin was not captured", None))?;

        // Stdin is fed while stdout/stderr drain.
        let write = async move {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        };
        let feed = async {
            let (written, output) = tokio::join!(write, child.wait_with_output());
            let output = output?;
            match written {
                // An early exit closes stdin; report the child's status instead.
                Err(e) if output.status.success() => Err(e),
                _ => Ok(output),
            }
        };

        match tokio::time::timeout(timeout, feed).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(DockerError::exec_failed(cmd_str, e)),
            Err(_) => Err(DockerError::timeout(cmd_str, timeout)),
        }
    }

    /// Stream service logs to the terminal. Inherits stdio.
    pub async fn logs(
        &self,
        service: &str,
        tail: Option<usize>,
        follow: bool,
    ) -> Result<(), DockerError> {
        let tail_str = tail.map(|n| n.to_string());
        let mut args = vec!["logs"];
        if let Some(ref n) = tail_str {
            args.push("--tail");
            args.push(n);
        }
        if follow {
            args.push("-f");
        }
        args.push(service);
        let full = self.compose_args(&args);
        let cmd_str = Self::command_string(&full);

        let status = tokio::process::Command::new("docker")
            .args(&full)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DockerError::exec_failed(&cmd_str, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::cmd_failed(cmd_str, "logs failed", status.code()))
        }
    }

    // ========================================================================
    // Daemon health
    // ========================================================================

    /// Fail with [`DockerError::DaemonUnavailable`] unless `docker info` answers.
    ///
    /// A missing docker binary surfaces as [`DockerError::ExecFailed`].
    pub async fn ensure_daemon(&self, timeout: Duration) -> Result<(), DockerError> {
        let output = self
            .run(&["info", "--format", "{{.ServerVersion}}"], timeout)
            .await?;
        if output.status.success() {
            Ok(())
        } else {
            tracing::debug!(
                "docker info failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Err(DockerError::DaemonUnavailable)
        }
    }
}
