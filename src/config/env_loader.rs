//! Dotenv loading and layering with the process environment.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Name of the dotenv file looked up in the working directory when none is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Load key/value pairs from a single dotenv file.
///
/// Uses dotenvy for parsing, which handles comments, quoting and blank lines.
/// The file is only read; nothing is exported into the process environment.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::InvalidConfig {
            key: "--env-file".to_string(),
            reason: format!("environment file not found: {}", path.display()),
        });
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| Error::InvalidConfig {
        key: "--env-file".to_string(),
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| Error::InvalidConfig {
            key: "--env-file".to_string(),
            reason: format!("failed to parse {}: {}", path.display(), e),
        })?;
        vars.insert(key, value);
    }

    tracing::debug!("Loaded {} variable(s) from {}", vars.len(), path.display());
    Ok(vars)
}

/// Build the configuration source map.
///
/// An explicit `env_file` must exist. Without one, `<work_dir>/.env` is read if
/// present and silently skipped otherwise. Values from `process_env` override
/// values from the file.
pub fn layered_environment(
    env_file: Option<&Path>,
    work_dir: &Path,
    process_env: HashMap<String, String>,
) -> Result<HashMap<String, String>> {
    let from_file = match env_file {
        Some(path) => load_env_file(work_dir.join(path))?,
        None => {
            let default = work_dir.join(DEFAULT_ENV_FILE);
            if default.is_file() {
                load_env_file(default)?
            } else {
                HashMap::new()
            }
        }
    };

    let mut merged = from_file;
    merged.extend(process_env); // process environment wins
    Ok(merged)
}
