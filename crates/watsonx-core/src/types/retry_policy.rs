//! Retry policy as it appears in configuration files
//!
//! A `RetryPolicy` is the serializable counterpart of
//! [`crate::retry::RetryConfig`]: it carries the numeric knobs only, while
//! callbacks, predicates and cancellation are attached in code.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Retry policy for remote calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Exclusive upper bound of the random delay added to the backoff, in
    /// milliseconds. Zero disables jitter.
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

impl RetryPolicy {
    /// Backoff as a `Duration`
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Maximum jitter as a `Duration`
    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }

    /// Check the policy invariants
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_retry_config(
                "max-attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    1000
}
fn default_max_jitter_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(), Duration::from_secs(1));
        assert_eq!(policy.max_jitter(), Duration::from_secs(1));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let policy: RetryPolicy = serde_yaml_ng::from_str("backoff-ms: 250\n").unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_ms, 250);
        assert_eq!(policy.max_jitter_ms, 1000);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(Error::InvalidRetryConfig { .. })
        ));
    }
}
