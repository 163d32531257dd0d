//! Retry policy loader with precedence
//!
//! Loads the retry policy from the following sources (low to high):
//! 1. Built-in defaults
//! 2. Policy file (~/.watsonx/retry.yaml)
//! 3. Environment variables (WATSONX_RETRY_* prefix)
//! 4. Builder overrides (handled by caller)

use crate::error::{Error, Result};
use crate::types::RetryPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;

/// File name of the retry policy inside the config directory
pub const RETRY_POLICY_FILE: &str = "retry.yaml";

const ENV_MAX_ATTEMPTS: &str = "WATSONX_RETRY_MAX_ATTEMPTS";
const ENV_BACKOFF_MS: &str = "WATSONX_RETRY_BACKOFF_MS";
const ENV_MAX_JITTER_MS: &str = "WATSONX_RETRY_MAX_JITTER_MS";

/// Retry policy loader
pub struct RetryConfigLoader {
    /// Directory holding `retry.yaml`
    config_dir: Utf8PathBuf,
}

impl RetryConfigLoader {
    /// Create a loader reading from the standard config directory (~/.watsonx)
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|_| Error::invalid_config("Home directory is not valid UTF-8"))?;

        Ok(home.join(".watsonx"))
    }

    /// Load the retry policy with hierarchical precedence
    ///
    /// A missing policy file is not an error. The merged policy is validated
    /// before it is returned.
    pub fn load_retry_policy(&self) -> Result<RetryPolicy> {
        let mut policy = RetryPolicy::default();

        let policy_path = self.policy_path();
        if policy_path.exists() {
            policy = Self::load_yaml_file(&policy_path)?;
        }

        policy = Self::apply_env_overrides(policy)?;
        policy.validate()?;

        tracing::debug!(
            max_attempts = policy.max_attempts,
            backoff_ms = policy.backoff_ms,
            max_jitter_ms = policy.max_jitter_ms,
            "loaded retry policy"
        );

        Ok(policy)
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<RetryPolicy> {
        let content = fs::read_to_string(path)?;

        // An empty file means "all defaults"
        if content.trim().is_empty() {
            return Ok(RetryPolicy::default());
        }

        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    fn apply_env_overrides(mut policy: RetryPolicy) -> Result<RetryPolicy> {
        if let Ok(val) = env::var(ENV_MAX_ATTEMPTS) {
            policy.max_attempts = val.trim().parse().map_err(|_| {
                Error::invalid_config(format!("{} must be a valid number", ENV_MAX_ATTEMPTS))
            })?;
        }

        if let Ok(val) = env::var(ENV_BACKOFF_MS) {
            policy.backoff_ms = val.trim().parse().map_err(|_| {
                Error::invalid_config(format!("{} must be a valid number", ENV_BACKOFF_MS))
            })?;
        }

        if let Ok(val) = env::var(ENV_MAX_JITTER_MS) {
            policy.max_jitter_ms = val.trim().parse().map_err(|_| {
                Error::invalid_config(format!("{} must be a valid number", ENV_MAX_JITTER_MS))
            })?;
        }

        Ok(policy)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path of the policy file
    pub fn policy_path(&self) -> Utf8PathBuf {
        self.config_dir.join(RETRY_POLICY_FILE)
    }
}
