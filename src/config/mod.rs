//! Configuration.
//!
//! - `types` - the [`Config`] struct, built once from a key/value source
//! - `env_loader` - dotenv loading layered under the process environment
//! - `duration` - `500ms` / `30s` / `1m` parsing

pub mod env_loader;

mod duration;
mod types;

pub use duration::*;
pub use types::*;
