//! Backup artifacts.
//!
//! An artifact is one plain file in the artifact directory holding a full
//! logical export. Files are written to a temp file in the same directory and
//! moved into place with a no-clobber persist, so a reader never sees a
//! truncated artifact and an existing one is never replaced.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lifecycle::Supervisor;
use crate::runtime::{DataStore, ProcessController};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extension appended to labels that carry none.
pub const ARTIFACT_EXTENSION: &str = "sql";

const DEFAULT_PREFIX: &str = "backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupArtifact {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Managed process the export was taken from, when known.
    pub source: Option<String>,
    pub size_bytes: u64,
}

/// Default artifact file name for a backup taken at `now`.
pub fn default_artifact_name(now: DateTime<Utc>) -> String {
    format!(
        "{}{}.{}",
        DEFAULT_PREFIX,
        now.format(TIMESTAMP_FORMAT),
        ARTIFACT_EXTENSION
    )
}

/// Turn a user label into an artifact file name.
///
/// Labels must be a plain file name. A label without an extension gets `.sql`.
pub fn artifact_file_name(label: &str) -> Result<String> {
    let invalid = |reason: &str| Error::InvalidArtifactName {
        name: label.to_string(),
        reason: reason.to_string(),
    };

    let label = label.trim();
    if label.is_empty() {
        return Err(invalid("name is empty"));
    }
    if label.contains('/') || label.contains('\\') {
        return Err(invalid("name must not contain path separators"));
    }
    if label.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    if label.contains("..") {
        return Err(invalid("name must not contain '..'"));
    }
    if label.chars().any(char::is_control) {
        return Err(invalid("name must not contain control characters"));
    }

    if Path::new(label).extension().is_some() {
        Ok(label.to_string())
    } else {
        Ok(format!("{}.{}", label, ARTIFACT_EXTENSION))
    }
}

pub struct BackupManager<'a, C> {
    supervisor: &'a Supervisor<C>,
    config: &'a Config,
}

impl<'a, C: ProcessController + DataStore> BackupManager<'a, C> {
    pub fn new(supervisor: &'a Supervisor<C>, config: &'a Config) -> Self {
        Self { supervisor, config }
    }

    pub fn directory(&self) -> &Path {
        &self.config.backup_dir
    }

    /// Export the store into a new artifact, named `name` or timestamped.
    ///
    /// Nothing touches the disk unless the process is running and the export
    /// succeeded with a non-empty payload.
    pub async fn backup(&self, name: Option<&str>) -> Result<BackupArtifact> {
        self.backup_at(name, Utc::now()).await
    }

    /// [`backup`](Self::backup) with an explicit clock reading.
    pub async fn backup_at(&self, name: Option<&str>, now: DateTime<Utc>) -> Result<BackupArtifact> {
        let credentials = self.config.credentials()?;
        let file_name = match name {
            Some(label) => artifact_file_name(label)?,
            None => default_artifact_name(now),
        };
        let path = self.directory().join(&file_name);

        self.supervisor.require_running().await?;

        if path.exists() {
            return Err(Error::ArtifactExists(path));
        }

        tracing::info!(
            "Exporting database '{}' from '{}'",
            credentials.database,
            self.supervisor.name()
        );
        let payload = self.supervisor.controller().export(&credentials).await?;
        if payload.is_empty() {
            return Err(Error::EmptyExport(credentials.database));
        }

        write_artifact(self.directory(), &path, &payload)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), payload.len());

        Ok(BackupArtifact {
            name: file_name,
            path,
            created_at: now,
            source: Some(self.supervisor.name()),
            size_bytes: payload.len() as u64,
        })
    }

    /// Artifacts currently in the directory, oldest first.
    ///
    /// A missing directory is an empty listing. Hidden files (including
    /// in-flight temp files) are skipped.
    pub fn list(&self) -> Result<Vec<BackupArtifact>> {
        list_artifacts(self.directory())
    }
}

/// Read the artifact directory, oldest first.
pub fn list_artifacts(dir: &Path) -> Result<Vec<BackupArtifact>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        artifacts.push(BackupArtifact {
            name,
            path: entry.path(),
            created_at,
            source: None,
            size_bytes: metadata.len(),
        });
    }

    artifacts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
    Ok(artifacts)
}

fn write_artifact(dir: &Path, path: &Path, payload: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)?;
    temp.write_all(payload)?;
    temp.as_file().sync_all()?;

    temp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            Error::ArtifactExists(path.to_path_buf())
        } else {
            Error::Io(e.error)
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::runtime::MemoryController;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config(dir: &Path, with_credentials: bool) -> Config {
        let mut vars = HashMap::new();
        if with_credentials {
            vars.insert("POSTGRES_USER".to_string(), "app".to_string());
            vars.insert("POSTGRES_PASSWORD".to_string(), "secret".to_string());
            vars.insert("POSTGRES_DB".to_string(), "study".to_string());
        }
        Config::from_vars(&vars, dir, ConfigOverrides::default()).unwrap()
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, secs).unwrap()
    }

    #[test]
    fn default_name_uses_utc_second_precision() {
        assert_eq!(default_artifact_name(at(26)), "backup_20260314_150926.sql");
    }

    #[test]
    fn labels_get_sql_extension() {
        assert_eq!(artifact_file_name("before-migration").unwrap(), "before-migration.sql");
        assert_eq!(artifact_file_name("nightly.dump").unwrap(), "nightly.dump");
    }

    #[test]
    fn labels_with_paths_are_rejected() {
        for bad in ["../escape", "a/b", "", ".hidden", "a\\b", "x..y"] {
            assert!(
                matches!(artifact_file_name(bad), Err(Error::InvalidArtifactName { .. })),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn backup_writes_complete_artifact() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), true);
        let supervisor = Supervisor::new(Arc::new(
            MemoryController::new("db").with_contents("CREATE TABLE t();").running(),
        ));

        let artifact = BackupManager::new(&supervisor, &config)
            .backup_at(None, at(1))
            .await
            .unwrap();

        assert_eq!(artifact.name, "backup_20260314_150901.sql");
        assert_eq!(artifact.path, dir.path().join("backups").join(&artifact.name));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"CREATE TABLE t();");
        assert_eq!(artifact.size_bytes, 17);
        assert_eq!(artifact.source.as_deref(), Some("db"));
    }

    #[tokio::test]
    async fn stopped_process_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), true);
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").with_contents("x")));

        let err = BackupManager::new(&supervisor, &config)
            .backup(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProcessNotRunning(_)));
        assert!(!dir.path().join("backups").exists());
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_runtime_call() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), false);
        let controller = MemoryController::new("db").running();
        controller.set_reachable(false);
        let supervisor = Supervisor::new(Arc::new(controller));

        let err = BackupManager::new(&supervisor, &config)
            .backup(Some("label"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(ref keys) if keys.len() == 3));
    }

    #[tokio::test]
    async fn existing_name_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), true);
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").with_contents("v1").running()));
        let manager = BackupManager::new(&supervisor, &config);

        let first = manager.backup(Some("pinned")).await.unwrap();
        supervisor.controller().set_contents("v2");
        let err = manager.backup(Some("pinned")).await.unwrap_err();

        assert!(matches!(err, Error::ArtifactExists(_)));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"v1");
    }

    #[tokio::test]
    async fn empty_export_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), true);
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").running()));

        let err = BackupManager::new(&supervisor, &config)
            .backup(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyExport(ref db) if db == "study"));
        assert!(list_artifacts(&config.backup_dir).unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_skips_hidden_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), true);
        let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").with_contents("data").running()));
        let manager = BackupManager::new(&supervisor, &config);

        manager.backup_at(None, at(1)).await.unwrap();
        manager.backup_at(None, at(2)).await.unwrap();
        std::fs::write(config.backup_dir.join(".partial-abc"), b"half").unwrap();
        std::fs::create_dir(config.backup_dir.join("nested")).unwrap();

        let names: Vec<_> = manager.list().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"backup_20260314_150901.sql".to_string()));
        assert!(names.contains(&"backup_20260314_150902.sql".to_string()));
    }

    #[test]
    fn write_never_replaces_a_file_that_appeared_meanwhile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nightly.sql");
        std::fs::write(&path, b"original").unwrap();

        let err = write_artifact(dir.path(), &path, b"newer").unwrap_err();

        assert!(matches!(err, Error::ArtifactExists(ref p) if p == &path));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".partial-"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }

    #[test]
    fn missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_artifacts(&dir.path().join("nope")).unwrap().is_empty());
    }
}
