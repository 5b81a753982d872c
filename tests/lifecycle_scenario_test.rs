//! End-to-end lifecycle scenarios against the in-memory controller.

use dbkeeper::config::{Config, ConfigOverrides};
use dbkeeper::lifecycle::wait_ready;
use dbkeeper::restore::AssumeYes;
use dbkeeper::{
    BackupManager, Confirm, Error, MemoryController, ProcessState, ReadinessGate, RestoreManager,
    RestoreOutcome, Supervisor,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

fn test_config(dir: &Path) -> Config {
    let vars: HashMap<String, String> = [
        ("POSTGRES_USER", "app"),
        ("POSTGRES_PASSWORD", "secret"),
        ("POSTGRES_DB", "study"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Config::from_vars(
        &vars,
        dir,
        ConfigOverrides {
            timeout: Some(Duration::from_secs(2)),
            interval: Some(Duration::from_millis(5)),
            ..Default::default()
        },
    )
    .expect("valid test config")
}

#[tokio::test]
async fn test_cold_start_backup_and_restore_cycle() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let supervisor = Supervisor::new(Arc::new(
        MemoryController::new("db")
            .with_contents("INSERT INTO users VALUES (1);")
            .healthy_after(3),
    ));

    // Cold: nothing running yet
    assert_eq!(supervisor.status().await.unwrap(), ProcessState::Stopped);

    supervisor.start().await.unwrap();
    ReadinessGate::new(config.readiness)
        .wait(&supervisor)
        .await
        .expect("should become ready within the timeout");
    assert_eq!(supervisor.status().await.unwrap(), ProcessState::Running);
    assert_eq!(supervisor.snapshot().last_health, Some(true));

    // Snapshot
    let artifact = BackupManager::new(&supervisor, &config)
        .backup(None)
        .await
        .unwrap();
    assert!(artifact.path.exists());
    assert!(std::fs::metadata(&artifact.path).unwrap().len() > 0);
    let snapshot = std::fs::read(&artifact.path).unwrap();

    // Data drifts after the backup
    supervisor
        .controller()
        .set_contents("INSERT INTO users VALUES (1), (2);");
    let drifted = supervisor.controller().contents();

    let restorer = RestoreManager::new(&supervisor, &config);

    // Declined: unchanged
    let outcome = restorer.restore(&artifact.path, &Decline).await.unwrap();
    assert_eq!(outcome, RestoreOutcome::UserDeclined);
    assert_eq!(supervisor.controller().contents(), drifted);

    // Accepted: back to the snapshot
    restorer.restore(&artifact.path, &AssumeYes).await.unwrap();
    assert_eq!(supervisor.controller().contents(), snapshot);
}

#[tokio::test]
async fn test_restore_then_backup_round_trips_contents() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let supervisor = Supervisor::new(Arc::new(
        MemoryController::new("db").with_contents("old").running(),
    ));

    let source = temp_dir.path().join("golden.sql");
    std::fs::write(&source, b"CREATE TABLE golden (id int);").unwrap();

    RestoreManager::new(&supervisor, &config)
        .restore(&source, &AssumeYes)
        .await
        .unwrap();
    let artifact = BackupManager::new(&supervisor, &config)
        .backup(Some("after-restore"))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(&artifact.path).unwrap(),
        std::fs::read(&source).unwrap()
    );
}

#[tokio::test]
async fn test_restore_of_missing_path_leaves_store_unmodified() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let supervisor = Supervisor::new(Arc::new(
        MemoryController::new("db").with_contents("live data").running(),
    ));
    let before = supervisor.controller().contents();

    let err = RestoreManager::new(&supervisor, &config)
        .restore(&temp_dir.path().join("does-not-exist.sql"), &AssumeYes)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ArtifactNotFound(_)));
    assert_eq!(supervisor.controller().contents(), before);
    assert_eq!(supervisor.controller().import_count(), 0);
}

#[tokio::test]
async fn test_backup_while_stopped_writes_nothing() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let supervisor = Supervisor::new(Arc::new(
        MemoryController::new("db").with_contents("live data"),
    ));

    let err = BackupManager::new(&supervisor, &config)
        .backup(None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProcessNotRunning(_)));
    assert!(!config.backup_dir.exists());
}

#[tokio::test]
async fn test_wait_ready_with_zero_timeout() {
    let supervisor = Supervisor::new(Arc::new(MemoryController::new("db").healthy_after(1)));
    supervisor.start().await.unwrap();

    let err = wait_ready(&supervisor, Duration::ZERO, Duration::from_millis(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReadinessTimeout { .. }));

    // The failed probe consumed the only unhealthy poll
    wait_ready(&supervisor, Duration::ZERO, Duration::from_millis(5))
        .await
        .expect("already healthy");
}

#[tokio::test]
async fn test_restart_preserves_data() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let supervisor = Supervisor::new(Arc::new(
        MemoryController::new("db").with_contents("kept").running(),
    ));

    supervisor.stop().await.unwrap();
    assert_eq!(supervisor.status().await.unwrap(), ProcessState::Stopped);
    supervisor.start().await.unwrap();
    ReadinessGate::new(config.readiness)
        .wait(&supervisor)
        .await
        .unwrap();

    assert_eq!(supervisor.controller().contents(), b"kept");
}
