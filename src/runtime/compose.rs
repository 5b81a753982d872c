//! Docker Compose adapter for a PostgreSQL service.

use super::{DataStore, ProcessController, ProcessState};
use crate::config::{Config, Credentials};
use crate::docker::{
    DockerClient, DockerError, DUMP_TIMEOUT, INSPECT_TIMEOUT, START_TIMEOUT, STOP_TIMEOUT,
};
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Controls one PostgreSQL service of a compose project through the docker CLI.
#[derive(Debug, Clone)]
pub struct ComposeController {
    client: DockerClient,
    service: String,
    probe_user: Option<String>,
    probe_database: Option<String>,
}

impl ComposeController {
    pub fn new(client: DockerClient, service: impl Into<String>) -> Self {
        Self {
            client,
            service: service.into(),
            probe_user: None,
            probe_database: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut controller = Self::new(
            DockerClient::new(config.compose_file.clone()),
            config.service.clone(),
        );
        controller.probe_user = config.user().map(str::to_string);
        controller.probe_database = config.database().map(str::to_string);
        controller
    }

    fn pg_isready_args(&self) -> Vec<&str> {
        let mut args = vec!["pg_isready", "-q"];
        if let Some(user) = &self.probe_user {
            args.extend(["-U", user.as_str()]);
        }
        if let Some(db) = &self.probe_database {
            args.extend(["-d", db.as_str()]);
        }
        args
    }
}

/// Parse the compose `{{.State}}` column into a [`ProcessState`].
pub fn parse_compose_state(state: Option<&str>) -> ProcessState {
    match state {
        Some(s) if s.eq_ignore_ascii_case("running") => ProcessState::Running,
        _ => ProcessState::Stopped,
    }
}

#[async_trait]
impl ProcessController for ComposeController {
    fn name(&self) -> &str {
        &self.service
    }

    async fn start(&self) -> Result<()> {
        self.client.ensure_daemon(INSPECT_TIMEOUT).await?;
        self.client.up(&self.service, START_TIMEOUT).await?;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.client.ensure_daemon(INSPECT_TIMEOUT).await?;
        self.client.stop(&self.service, STOP_TIMEOUT).await?;
        Ok(())
    }

    async fn purge(&self) -> Result<()> {
        self.client.ensure_daemon(INSPECT_TIMEOUT).await?;
        self.client
            .down_volumes(&self.service, STOP_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn status(&self) -> Result<ProcessState> {
        self.client.ensure_daemon(INSPECT_TIMEOUT).await?;
        let state = self
            .client
            .service_state(&self.service, INSPECT_TIMEOUT)
            .await?;
        tracing::debug!("Service '{}' compose state: {:?}", self.service, state);
        Ok(parse_compose_state(state.as_deref()))
    }

    async fn healthcheck(&self) -> Result<bool> {
        let args = self.pg_isready_args();
        match self
            .client
            .exec(&self.service, &[], &args, INSPECT_TIMEOUT)
            .await
        {
            Ok(output) if output.status.success() => Ok(true),
            Ok(output) => match Error::from(DockerError::failed("pg_isready", &self.service, &output)) {
                err @ Error::EnvironmentUnavailable(_) => Err(err),
                // Not accepting connections yet, or the container is still being created.
                err => {
                    tracing::debug!("Service '{}' not ready: {}", self.service, err);
                    Ok(false)
                }
            },
            Err(DockerError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn logs(&self, tail: Option<usize>, follow: bool) -> Result<()> {
        self.client.logs(&self.service, tail, follow).await?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for ComposeController {
    async fn export(&self, credentials: &Credentials) -> Result<Vec<u8>> {
        let cmd = [
            "pg_dump",
            "--clean",
            "--if-exists",
            "--no-owner",
            "-U",
            credentials.user.as_str(),
            "-d",
            credentials.database.as_str(),
        ];
        let env = [("PGPASSWORD", credentials.password.as_str())];
        let output = self
            .client
            .exec(&self.service, &env, &cmd, DUMP_TIMEOUT)
            .await?;
        if !output.status.success() {
            return Err(DockerError::failed("pg_dump", &self.service, &output).into());
        }
        Ok(output.stdout)
    }

    async fn import(&self, credentials: &Credentials, dump: &[u8]) -> Result<()> {
        let cmd = [
            "psql",
            "-q",
            "-v",
            "ON_ERROR_STOP=1",
            "--single-transaction",
            "-U",
            credentials.user.as_str(),
            "-d",
            credentials.database.as_str(),
        ];
        let env = [("PGPASSWORD", credentials.password.as_str())];
        let output = self
            .client
            .exec_with_stdin(&self.service, &env, &cmd, dump, DUMP_TIMEOUT)
            .await?;
        if !output.status.success() {
            return Err(DockerError::failed("psql", &self.service, &output).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_state_running_is_case_insensitive() {
        assert_eq!(parse_compose_state(Some("running")), ProcessState::Running);
        assert_eq!(parse_compose_state(Some("Running")), ProcessState::Running);
    }

    #[test]
    fn anything_else_is_stopped() {
        assert_eq!(parse_compose_state(Some("exited")), ProcessState::Stopped);
        assert_eq!(parse_compose_state(Some("restarting")), ProcessState::Stopped);
        assert_eq!(parse_compose_state(None), ProcessState::Stopped);
    }

    #[test]
    fn pg_isready_probe_uses_configured_login() {
        let mut controller = ComposeController::new(DockerClient::new("docker-compose.yml"), "db");
        assert_eq!(controller.pg_isready_args(), vec!["pg_isready", "-q"]);

        controller.probe_user = Some("app".to_string());
        controller.probe_database = Some("study".to_string());
        assert_eq!(
            controller.pg_isready_args(),
            vec!["pg_isready", "-q", "-U", "app", "-d", "study"]
        );
    }
}
