use crate::output::UserOutput;
use dbkeeper::{Confirm, ProcessController, Supervisor};

pub async fn run_clean<C: ProcessController>(
    supervisor: &Supervisor<C>,
    confirm: &dyn Confirm,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let name = supervisor.name();
    let prompt = format!(
        "Stop {} and permanently delete all of its data? Backup files are kept.",
        name
    );
    if !confirm.confirm(&prompt) {
        out.status("Aborted.");
        return Ok(());
    }

    out.progress(&format!("Removing {} and its data volumes...", name));
    if let Err(e) = supervisor.teardown().await {
        out.finish_progress(" failed");
        return Err(e.into());
    }
    out.finish_progress(" done");
    out.success("Database data deleted");
    Ok(())
}
