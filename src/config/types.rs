use super::parse_duration_value;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_USER: &str = "POSTGRES_USER";
pub const ENV_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const ENV_DATABASE: &str = "POSTGRES_DB";
pub const ENV_COMPOSE_FILE: &str = "DBKEEPER_COMPOSE_FILE";
pub const ENV_SERVICE: &str = "DBKEEPER_SERVICE";
pub const ENV_BACKUP_DIR: &str = "DBKEEPER_BACKUP_DIR";
pub const ENV_READY_TIMEOUT: &str = "DBKEEPER_READY_TIMEOUT";
pub const ENV_READY_INTERVAL: &str = "DBKEEPER_READY_INTERVAL";

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_SERVICE: &str = "db";
pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_secs(2);

/// Database login used for export and import.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Polling budget for the readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READY_TIMEOUT,
            interval: DEFAULT_READY_INTERVAL,
        }
    }
}

/// Values given on the command line. Each one beats its environment key.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub compose_file: Option<PathBuf>,
    pub service: Option<String>,
    pub backup_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
}

/// Process-wide configuration, built once at startup and passed down by reference.
#[derive(Clone)]
pub struct Config {
    pub compose_file: PathBuf,
    pub service: String,
    pub backup_dir: PathBuf,
    pub readiness: ReadinessSettings,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("compose_file", &self.compose_file)
            .field("service", &self.service)
            .field("backup_dir", &self.backup_dir)
            .field("readiness", &self.readiness)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

impl Config {
    /// Build the configuration from a key/value source (usually the layered
    /// process environment). Relative paths resolve against `work_dir`.
    pub fn from_vars(
        vars: &HashMap<String, String>,
        work_dir: &Path,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let lookup = |key: &str| -> Option<String> {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        // Credentials are passed through verbatim; blank still means unset.
        let credential = |key: &str| -> Option<String> {
            vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
        };

        let timeout = match (overrides.timeout, lookup(ENV_READY_TIMEOUT)) {
            (Some(t), _) => t,
            (None, Some(raw)) => parse_duration_value(ENV_READY_TIMEOUT, &raw)?,
            (None, None) => DEFAULT_READY_TIMEOUT,
        };
        let interval = match (overrides.interval, lookup(ENV_READY_INTERVAL)) {
            (Some(i), _) => i,
            (None, Some(raw)) => parse_duration_value(ENV_READY_INTERVAL, &raw)?,
            (None, None) => DEFAULT_READY_INTERVAL,
        };
        if interval.is_zero() {
            return Err(Error::InvalidConfig {
                key: ENV_READY_INTERVAL.to_string(),
                reason: "poll interval must be greater than zero".to_string(),
            });
        }

        let compose_file = overrides
            .compose_file
            .or_else(|| lookup(ENV_COMPOSE_FILE).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPOSE_FILE));
        let backup_dir = overrides
            .backup_dir
            .or_else(|| lookup(ENV_BACKUP_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
        let service = overrides
            .service
            .or_else(|| lookup(ENV_SERVICE))
            .unwrap_or_else(|| DEFAULT_SERVICE.to_string());

        Ok(Self {
            compose_file: work_dir.join(compose_file),
            service,
            backup_dir: work_dir.join(backup_dir),
            readiness: ReadinessSettings { timeout, interval },
            user: credential(ENV_USER),
            password: credential(ENV_PASSWORD),
            database: credential(ENV_DATABASE),
        })
    }

    /// Credentials for data-store access.
    ///
    /// Fails with [`Error::ConfigurationMissing`] naming every absent key.
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.user, &self.password, &self.database) {
            (Some(user), Some(password), Some(database)) => Ok(Credentials {
                user: user.clone(),
                password: password.clone(),
                database: database.clone(),
            }),
            _ => {
                let missing = [
                    (ENV_USER, self.user.is_none()),
                    (ENV_PASSWORD, self.password.is_none()),
                    (ENV_DATABASE, self.database.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(key, _)| key.to_string())
                .collect();
                Err(Error::ConfigurationMissing(missing))
            }
        }
    }

    /// Database name if configured; used for display and health probes.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Database user if configured; used for health probes.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}
