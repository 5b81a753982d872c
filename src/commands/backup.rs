use crate::output::UserOutput;
use dbkeeper::backup::list_artifacts;
use dbkeeper::{BackupManager, Config, DataStore, ProcessController, Supervisor};

pub async fn run_backup<C: ProcessController + DataStore>(
    supervisor: &Supervisor<C>,
    config: &Config,
    name: Option<&str>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let manager = BackupManager::new(supervisor, config);

    out.progress(&format!("Backing up {}...", supervisor.name()));
    let artifact = match manager.backup(name).await {
        Ok(artifact) => artifact,
        Err(e) => {
            out.finish_progress(" failed");
            return Err(e.into());
        }
    };
    out.finish_progress(&format!(" {} bytes", artifact.size_bytes));

    out.data(&artifact.path.display().to_string());
    Ok(())
}

/// List artifacts. Reads the directory only; the database is not contacted.
pub fn run_backups(config: &Config, json: bool, out: &dyn UserOutput) -> anyhow::Result<()> {
    let artifacts = list_artifacts(&config.backup_dir)?;

    if json {
        out.data(&serde_json::to_string_pretty(&artifacts)?);
        return Ok(());
    }

    if artifacts.is_empty() {
        out.status(&format!("No backups in {}", config.backup_dir.display()));
        return Ok(());
    }

    out.status(&format!("Backups in {}:", config.backup_dir.display()));
    out.status(&format!("{:-<70}", ""));
    for artifact in &artifacts {
        out.data(&format!(
            "  {:<40} {:>12} {}",
            artifact.name,
            format_size(artifact.size_bytes),
            artifact.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
