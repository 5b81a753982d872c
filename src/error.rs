// thiserror's expansion of struct variants trips unused_assignments.
#![allow(unused_assignments)]

use crate::docker::DockerError;
use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Container runtime unavailable: {0}")]
    #[diagnostic(
        code(dbkeeper::runtime::unavailable),
        help("Check that Docker is running with `docker info`")
    )]
    EnvironmentUnavailable(String),

    #[error("Database service '{0}' is not running")]
    #[diagnostic(
        code(dbkeeper::process::not_running),
        help("Start it with: dbkeeper start")
    )]
    ProcessNotRunning(String),

    #[error("Database service '{service}' did not become ready within {timeout:?}")]
    #[diagnostic(
        code(dbkeeper::process::readiness_timeout),
        help("Check the database logs with `dbkeeper logs` or raise --timeout")
    )]
    ReadinessTimeout { service: String, timeout: Duration },

    #[error("Backup artifact not found or empty: {}", .0.display())]
    #[diagnostic(
        code(dbkeeper::artifact::not_found),
        help("List available backups with `dbkeeper backups`")
    )]
    ArtifactNotFound(PathBuf),

    #[error("Backup artifact already exists: {}", .0.display())]
    #[diagnostic(
        code(dbkeeper::artifact::exists),
        help("Pick a different backup name or remove the existing file first")
    )]
    ArtifactExists(PathBuf),

    #[error("Invalid backup name '{name}': {reason}")]
    #[diagnostic(code(dbkeeper::artifact::invalid_name))]
    InvalidArtifactName { name: String, reason: String },

    #[error("Missing required configuration: {}", .0.join(", "))]
    #[diagnostic(
        code(dbkeeper::config::missing),
        help("Set the variables in the environment or in a .env file")
    )]
    ConfigurationMissing(Vec<String>),

    #[error("Invalid configuration value for '{key}': {reason}")]
    #[diagnostic(code(dbkeeper::config::invalid))]
    InvalidConfig { key: String, reason: String },

    #[error("Docker error: {0}")]
    #[diagnostic(code(dbkeeper::docker::error))]
    Docker(DockerError),

    #[error("Export of database '{0}' produced no data")]
    #[diagnostic(code(dbkeeper::artifact::empty_export))]
    EmptyExport(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Marker stderr fragments the docker CLI prints when the daemon is down.
const DAEMON_DOWN_MARKERS: &[&str] = &[
    "Cannot connect to the Docker daemon",
    "Is the docker daemon running",
    "error during connect",
];

impl From<DockerError> for Error {
    fn from(err: DockerError) -> Self {
        match err {
            DockerError::ExecFailed { .. } | DockerError::DaemonUnavailable => {
                Error::EnvironmentUnavailable(err.to_string())
            }
            DockerError::CommandFailed { ref stderr, .. }
                if DAEMON_DOWN_MARKERS.iter().any(|m| stderr.contains(m)) =>
            {
                Error::EnvironmentUnavailable(err.to_string())
            }
            other => Error::Docker(other),
        }
    }
}

impl Error {
    /// Process exit code the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigurationMissing(_) | Error::InvalidConfig { .. } => 2,
            Error::EnvironmentUnavailable(_) => 3,
            Error::ProcessNotRunning(_) => 4,
            Error::ReadinessTimeout { .. } => 5,
            Error::ArtifactNotFound(_) => 6,
            Error::ArtifactExists(_) | Error::InvalidArtifactName { .. } => 7,
            Error::Docker(_) | Error::EmptyExport(_) | Error::Io(_) | Error::Json(_) => 1,
        }
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::EnvironmentUnavailable(_) => {
                Some("Check that Docker is installed and running: docker info".to_string())
            }
            Error::ProcessNotRunning(_) => Some("Start the database with: dbkeeper start".to_string()),
            Error::ReadinessTimeout { .. } => Some(
                "The database may still be initializing. Inspect `dbkeeper logs` or retry with a longer --timeout.".to_string(),
            ),
            Error::ArtifactNotFound(_) => {
                Some("List available backups with: dbkeeper backups".to_string())
            }
            Error::ArtifactExists(path) => Some(format!(
                "Backups are never overwritten. Choose another name or delete {} first.",
                path.display()
            )),
            Error::ConfigurationMissing(keys) => Some(format!(
                "Add the missing variables to your .env file:\n\n{}",
                keys.iter()
                    .map(|k| format!("  {}=...", k))
                    .collect::<Vec<_>>()
                    .join("\n")
            )),
            Error::InvalidConfig { .. } => Some(
                "Durations accept forms like 500ms, 30s, 1m or a bare number of seconds".to_string(),
            ),
            Error::Docker(DockerError::Timeout { .. }) => Some(
                "The docker command did not finish in time. Check `docker compose ps` for a stuck container.".to_string(),
            ),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_failure_maps_to_environment_unavailable() {
        let err: Error = DockerError::exec_failed(
            "docker info",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        )
        .into();
        assert!(matches!(err, Error::EnvironmentUnavailable(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn daemon_down_stderr_maps_to_environment_unavailable() {
        let err: Error = DockerError::cmd_failed(
            "docker compose ps",
            "Cannot connect to the Docker daemon at unix:///var/run/docker.sock.",
            Some(1),
        )
        .into();
        assert!(matches!(err, Error::EnvironmentUnavailable(_)));
    }

    #[test]
    fn other_command_failures_stay_docker_errors() {
        let err: Error =
            DockerError::cmd_failed("docker compose up", "no such service: db", Some(1)).into();
        assert!(matches!(err, Error::Docker(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn every_taxonomy_error_exits_non_zero() {
        let errors = vec![
            Error::EnvironmentUnavailable("down".into()),
            Error::ProcessNotRunning("db".into()),
            Error::ReadinessTimeout {
                service: "db".into(),
                timeout: Duration::from_secs(1),
            },
            Error::ArtifactNotFound(PathBuf::from("x.sql")),
            Error::ConfigurationMissing(vec!["POSTGRES_USER".into()]),
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{} should fail the process", err);
        }
    }

    #[test]
    fn missing_configuration_lists_every_key() {
        let err = Error::ConfigurationMissing(vec![
            "POSTGRES_USER".to_string(),
            "POSTGRES_DB".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration: POSTGRES_USER, POSTGRES_DB"
        );
        let hint = err.suggestion().unwrap();
        assert!(hint.contains("POSTGRES_USER=..."));
        assert!(hint.contains("POSTGRES_DB=..."));
    }

    #[test]
    fn with_suggestion_appends_hint() {
        let err = Error::ProcessNotRunning("db".into());
        assert_eq!(
            err.with_suggestion(),
            "Database service 'db' is not running\n\nHint: Start the database with: dbkeeper start"
        );
    }
}
