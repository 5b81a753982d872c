mod backup;
mod clean;
mod logs;
mod restart;
mod restore;
mod start;
mod status;
mod stop;

pub use backup::{run_backup, run_backups};
pub use clean::run_clean;
pub use logs::run_logs;
pub use restart::run_restart;
pub use restore::run_restore;
pub use start::run_start;
pub use status::run_status;
pub use stop::run_stop;

#[cfg(test)]
pub(crate) mod test_support {
    use dbkeeper::config::{Config, ConfigOverrides};
    use std::collections::HashMap;
    use std::path::Path;
    use std::time::Duration;

    pub fn config(dir: &Path) -> Config {
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
        .unwrap()
    }
}
