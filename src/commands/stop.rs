use crate::output::UserOutput;
use dbkeeper::{ProcessController, Supervisor};

pub async fn run_stop<C: ProcessController>(
    supervisor: &Supervisor<C>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    out.progress(&format!("Stopping {}...", supervisor.name()));
    match supervisor.stop().await {
        Ok(()) => {
            out.finish_progress(" done");
            Ok(())
        }
        Err(e) => {
            out.finish_progress(" failed");
            Err(e.into())
        }
    }
}
