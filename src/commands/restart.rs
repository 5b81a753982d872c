use super::{run_start, run_stop};
use crate::output::UserOutput;
use dbkeeper::{ProcessController, ReadinessGate, Supervisor};

/// `stop` followed by `start`; the first failure ends the sequence.
pub async fn run_restart<C: ProcessController>(
    supervisor: &Supervisor<C>,
    gate: &ReadinessGate,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    run_stop(supervisor, out).await?;
    run_start(supervisor, gate, out).await
}
