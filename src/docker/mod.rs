//! Docker CLI plumbing.
//!
//! [`DockerClient`] wraps every `docker` / `docker compose` invocation the
//! crate makes; [`DockerError`] is its structured failure type.

pub mod client;
pub mod error;

pub use client::DockerClient;
pub use error::DockerError;

use std::time::Duration;

/// Timeout for quick inspection commands (`docker info`, `compose ps`).
pub const INSPECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for `compose up`, which may pull an image on first start.
pub const START_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for `compose stop` / `compose down`.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for a full logical export or import.
pub const DUMP_TIMEOUT: Duration = Duration::from_secs(1800);
