use crate::output::UserOutput;
use dbkeeper::{ProcessController, Supervisor};

pub async fn run_logs<C: ProcessController>(
    supervisor: &Supervisor<C>,
    tail: Option<usize>,
    follow: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    if follow {
        out.status(&format!(
            "Following logs for {} (Press Ctrl+C to stop):",
            supervisor.name()
        ));
    }
    supervisor.logs(tail, follow).await?;
    Ok(())
}
