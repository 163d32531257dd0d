//! Configuration loading

mod loader;

pub use loader::{RetryConfigLoader, RETRY_POLICY_FILE};
