use crate::output::UserOutput;
use dbkeeper::{ProcessController, ProcessState, Supervisor};

pub async fn run_status<C: ProcessController>(
    supervisor: &Supervisor<C>,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let state = supervisor.status().await?;
    let healthy = match state {
        ProcessState::Running => Some(supervisor.healthcheck().await?),
        ProcessState::Stopped => None,
    };

    if json {
        let status = serde_json::json!({
            "name": supervisor.name(),
            "state": state,
            "healthy": healthy,
        });
        out.data(&serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let (icon, detail) = match healthy {
        Some(true) => ("+", "running, accepting connections"),
        Some(false) => (".", "running, not ready yet"),
        None => ("o", "stopped"),
    };
    out.data(&format!("  {} {:<20} {}", icon, supervisor.name(), detail));
    Ok(())
}
