//! # dbkeeper
//!
//! Lifecycle manager for a containerized development database.
//!
//! ## Components
//!
//! - **Supervisor** ([`lifecycle::Supervisor`]): start, stop and inspect the
//!   managed data-store process through a [`runtime::ProcessController`]
//! - **Readiness gate** ([`lifecycle::ReadinessGate`]): fixed-interval health
//!   polling with a deadline
//! - **Backups** ([`backup::BackupManager`]): atomic, never-overwriting logical
//!   exports into an artifact directory
//! - **Restore** ([`restore::RestoreManager`]): destructive import guarded by a
//!   default-deny [`restore::Confirm`] gate
//!
//! ## Quick Start
//!
//! ```no_run
//! use dbkeeper::config::{Config, ConfigOverrides};
//! use dbkeeper::lifecycle::{ReadinessGate, Supervisor};
//! use dbkeeper::runtime::ComposeController;
//! use dbkeeper::BackupManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), dbkeeper::Error> {
//! let vars: std::collections::HashMap<String, String> = std::env::vars().collect();
//! let config = Config::from_vars(&vars, std::path::Path::new("."), ConfigOverrides::default())?;
//!
//! let supervisor = Supervisor::new(Arc::new(ComposeController::from_config(&config)));
//! supervisor.start().await?;
//! ReadinessGate::new(config.readiness).wait(&supervisor).await?;
//!
//! let artifact = BackupManager::new(&supervisor, &config).backup(None).await?;
//! println!("{}", artifact.path.display());
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod docker;
pub mod error;
pub mod lifecycle;
pub mod restore;
pub mod runtime;

pub use backup::{BackupArtifact, BackupManager};
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use lifecycle::{ReadinessGate, Supervisor};
pub use restore::{Confirm, RestoreManager, RestoreOutcome};
pub use runtime::{ComposeController, DataStore, MemoryController, ProcessController, ProcessState};
