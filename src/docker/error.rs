use std::fmt;
use std::time::Duration;

/// Structured error type for `docker` / `docker compose` invocations.
#[derive(Debug)]
pub enum DockerError {
    /// Command did not finish before its deadline.
    Timeout { command: String, timeout: Duration },

    /// Command ran but returned non-zero exit.
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// The docker binary couldn't be executed (not in PATH, permission denied).
    ExecFailed {
        command: String,
        source: std::io::Error,
    },

    /// Compose file does not define the requested service.
    ServiceNotDefined { service: String },

    /// Docker daemon not responding.
    DaemonUnavailable,
}

impl DockerError {
    pub fn timeout(cmd: impl Into<String>, dur: Duration) -> Self {
        DockerError::Timeout {
            command: cmd.into(),
            timeout: dur,
        }
    }

    /// Build a command-failed error from a finished process, classifying
    /// well-known compose messages into dedicated variants.
    pub fn failed(cmd: impl Into<String>, service: &str, output: &std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("no such service") {
            return DockerError::ServiceNotDefined {
                service: service.to_string(),
            };
        }
        DockerError::CommandFailed {
            command: cmd.into(),
            stderr,
            exit_code: output.status.code(),
        }
    }

    pub fn cmd_failed(
        cmd: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        DockerError::CommandFailed {
            command: cmd.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn exec_failed(cmd: impl Into<String>, err: std::io::Error) -> Self {
        DockerError::ExecFailed {
            command: cmd.into(),
            source: err,
        }
    }
}

impl fmt::Display for DockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerError::Timeout { command, timeout } => {
                write!(f, "Timed out running '{}' after {:?}", command, timeout)
            }
            DockerError::CommandFailed {
                command,
                stderr,
                exit_code: Some(code),
            } => write!(f, "'{}' failed (exit code {}): {}", command, code, stderr),
            DockerError::CommandFailed {
                command, stderr, ..
            } => write!(f, "'{}' failed: {}", command, stderr),
            DockerError::ExecFailed { command, source } => {
                write!(f, "Failed to execute '{}': {}", command, source)
            }
            DockerError::ServiceNotDefined { service } => {
                write!(f, "Compose file has no service named '{}'", service)
            }
            DockerError::DaemonUnavailable => write!(f, "Docker daemon is not responding"),
        }
    }
}

impl std::error::Error for DockerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockerError::ExecFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
