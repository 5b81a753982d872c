use crate::output::UserOutput;
use dbkeeper::{Config, Confirm, DataStore, ProcessController, RestoreManager, RestoreOutcome, Supervisor};
use std::path::Path;

pub async fn run_restore<C: ProcessController + DataStore>(
    supervisor: &Supervisor<C>,
    config: &Config,
    artifact: &Path,
    confirm: &dyn Confirm,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let manager = RestoreManager::new(supervisor, config);

    match manager.restore(artifact, confirm).await? {
        RestoreOutcome::Restored { path, bytes } => {
            out.success(&format!(
                "Restored {} ({} bytes) into {}",
                path.display(),
                bytes,
                supervisor.name()
            ));
        }
        RestoreOutcome::UserDeclined => {
            out.status("Restore cancelled; the database was not changed.");
        }
    }
    Ok(())
}
