//! Process supervision and readiness gating.

mod readiness;
mod supervisor;

pub use readiness::{wait_ready, ReadinessGate};
pub use supervisor::{DesiredState, ManagedProcess, Supervisor};
