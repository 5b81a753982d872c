use crate::output::UserOutput;
use dbkeeper::{ProcessController, ReadinessGate, Supervisor};

pub async fn run_start<C: ProcessController>(
    supervisor: &Supervisor<C>,
    gate: &ReadinessGate,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let name = supervisor.name();

    out.progress(&format!("Starting {}...", name));
    if let Err(e) = supervisor.start().await {
        out.finish_progress(" failed");
        return Err(e.into());
    }
    out.finish_progress(" launched");

    out.progress(&format!(
        "Waiting for {} to accept connections (timeout {:?})...",
        name,
        gate.settings().timeout
    ));
    match gate.wait(supervisor).await {
        Ok(elapsed) => out.finish_progress(&format!(" ready in {:.1}s", elapsed.as_secs_f64())),
        Err(e) => {
            out.finish_progress(" gave up");
            return Err(e.into());
        }
    }

    out.success(&format!("{} is ready", name));
    Ok(())
}
