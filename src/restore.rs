//! Destructive restore behind a default-deny confirmation gate.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lifecycle::Supervisor;
use crate::runtime::{DataStore, ProcessController};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Yes/no acknowledgment for destructive operations.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Asks on the terminal. The prompt goes to stderr so stdout carries only
/// data. Anything but `y` / `yes` (including empty input, EOF and read errors)
/// is a no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        write_prompt(&mut std::io::stderr(), prompt);

        let mut input = String::new();
        match std::io::stdin().lock().read_line(&mut input) {
            Ok(_) => is_affirmative(&input),
            Err(e) => {
                tracing::debug!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Confirms without asking (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

fn write_prompt<W: Write>(out: &mut W, prompt: &str) {
    write!(out, "{} [y/N] ", prompt).ok();
    out.flush().ok();
}

pub fn is_affirmative(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { path: PathBuf, bytes: u64 },
    /// Confirmation refused. Nothing was changed.
    UserDeclined,
}

pub struct RestoreManager<'a, C> {
    supervisor: &'a Supervisor<C>,
    config: &'a Config,
}

impl<'a, C: ProcessController + DataStore> RestoreManager<'a, C> {
    pub fn new(supervisor: &'a Supervisor<C>, config: &'a Config) -> Self {
        Self { supervisor, config }
    }

    /// Overwrite the store with the contents of `artifact`.
    ///
    /// Checks, in order: the artifact exists and is non-empty, credentials are
    /// configured, the process is running, and `confirm` agrees.
    pub async fn restore(&self, artifact: &Path, confirm: &dyn Confirm) -> Result<RestoreOutcome> {
        let size = match std::fs::metadata(artifact) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            _ => return Err(Error::ArtifactNotFound(artifact.to_path_buf())),
        };
        let credentials = self.config.credentials()?;
        self.supervisor.require_running().await?;

        let prompt = format!(
            "Restore {} into database '{}' on '{}'? All current data will be replaced.",
            artifact.display(),
            credentials.database,
            self.supervisor.name()
        );
        if !confirm.confirm(&prompt) {
            tracing::info!("Restore of {} declined", artifact.display());
            return Ok(RestoreOutcome::UserDeclined);
        }

        let dump = std::fs::read(artifact)?;
        tracing::warn!(
            "Restoring {} ({} bytes) into '{}'",
            artifact.display(),
            size,
            credentials.database
        );
        self.supervisor
            .controller()
            .import(&credentials, &dump)
            .await?;

        Ok(RestoreOutcome::Restored {
            path: artifact.to_path_buf(),
            bytes: dump.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::runtime::MemoryController;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Answer {
        yes: bool,
        asked: Cell<usize>,
    }

    impl Answer {
        fn new(yes: bool) -> Self {
            Self {
                yes,
                asked: Cell::new(0),
            }
        }
    }

    impl Confirm for Answer {
        fn confirm(&self, _prompt: &str) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.yes
        }
    }

    fn config(dir: &Path) -> Config {
        let vars: HashMap<String, String> = [
            ("POSTGRES_USER", "app"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "study"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Config::from_vars(&vars, dir, ConfigOverrides::default()).unwrap()
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn prompt_shows_default_no() {
        let mut buf = Vec::new();
        write_prompt(&mut buf, "Restore?");
        assert_eq!(String::from_utf8(buf).unwrap(), "Restore? [y/N] ");
    }

    #[tokio::test]
    async fn missing_artifact_is_reported_before_anything_else() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let controller = MemoryController::new("db").with_contents("live");
        controller.set_reachable(false);
        let supervisor = Supervisor::new(Arc::new(controller));
        let answer = Answer::new(true);

        let err = RestoreManager::new(&supervisor, &config)
            .restore(&dir.path().join("missing.sql"), &answer)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ArtifactNotFound(_)));
        assert_eq!(answer.asked.get(), 0);
        assert_eq!(supervisor.controller().contents(), b"live");
    }

    #[tokio::test]
    async fn empty_artifact_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let artifact = dir.path().join("empty.sql");
        std::fs::write(&artifact, b"").unwrap();
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").running()));

        let err = RestoreManager::new(&supervisor, &config)
            .restore(&artifact, &AssumeYes)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound(_)));
    }

    #[tokio::test]
    async fn stopped_process_is_rejected_without_prompting() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let artifact = dir.path().join("dump.sql");
        std::fs::write(&artifact, b"snapshot").unwrap();
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db")));
        let answer = Answer::new(true);

        let err = RestoreManager::new(&supervisor, &config)
            .restore(&artifact, &answer)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProcessNotRunning(_)));
        assert_eq!(answer.asked.get(), 0);
    }

    #[tokio::test]
    async fn declined_confirmation_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let artifact = dir.path().join("dump.sql");
        std::fs::write(&artifact, b"snapshot").unwrap();
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").with_contents("live").running()));
        let answer = Answer::new(false);

        let outcome = RestoreManager::new(&supervisor, &config)
            .restore(&artifact, &answer)
            .await
            .unwrap();

        assert_eq!(outcome, RestoreOutcome::UserDeclined);
        assert_eq!(answer.asked.get(), 1);
        assert_eq!(supervisor.controller().contents(), b"live");
        assert_eq!(supervisor.controller().import_count(), 0);
    }

    #[tokio::test]
    async fn confirmed_restore_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let artifact = dir.path().join("dump.sql");
        std::fs::write(&artifact, b"snapshot").unwrap();
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").with_contents("live").running()));

        let outcome = RestoreManager::new(&supervisor, &config)
            .restore(&artifact, &AssumeYes)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                path: artifact.clone(),
                bytes: 8
            }
        );
        assert_eq!(supervisor.controller().contents(), b"snapshot");
    }
}
