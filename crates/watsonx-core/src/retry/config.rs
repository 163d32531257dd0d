//! Retry engine configuration
//!
//! [`RetryConfig`] is immutable once built. [`RetryConfigBuilder`] starts from
//! the documented defaults and each `with_*` method overrides exactly one
//! setting:
//!
//! | setting | default |
//! |---|---|
//! | max attempts | 3 |
//! | backoff | 1s |
//! | max jitter | 1s |
//! | on-retry callback | no-op |
//! | retry predicate | retry every error |
//! | cancellation | a token nobody cancels |
//! | observer | [`NoOpObserver`] |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::types::RetryPolicy;

use super::error::AttemptError;
use super::observer::{NoOpObserver, RetryObserver};
use super::strategies::{AlwaysRetry, ClosurePredicate, RetryPredicate};

/// Callback invoked with the 1-based attempt number and its error before
/// each wait
pub type OnRetryFn<E> = dyn Fn(u32, &AttemptError<E>) + Send + Sync;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
const DEFAULT_MAX_JITTER: Duration = Duration::from_secs(1);

fn ignore_retry<E>(_attempt: u32, _error: &AttemptError<E>) {}

/// Settings for one or more [`retry`](super::retry) calls
///
/// `E` is the transport error of the retried operation. A config holds no
/// per-call state and can be shared by concurrent calls.
pub struct RetryConfig<E> {
    max_attempts: u32,
    backoff: Duration,
    max_jitter: Duration,
    on_retry: Arc<OnRetryFn<E>>,
    predicate: Arc<dyn RetryPredicate<AttemptError<E>>>,
    cancellation: CancellationToken,
    observer: Arc<dyn RetryObserver>,
}

impl<E: 'static> RetryConfig<E> {
    /// Start building a config from the defaults
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }

    /// Build a config from a serializable policy, keeping the other defaults
    pub fn from_policy(policy: &RetryPolicy) -> Result<Self> {
        Self::builder().with_policy(policy).build()
    }
}

impl<E> RetryConfig<E> {
    /// Number of attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed wait between attempts
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Exclusive upper bound of the random extra wait
    pub fn max_jitter(&self) -> Duration {
        self.max_jitter
    }

    /// The token checked before every attempt and raced against every wait
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub(crate) fn observer(&self) -> &dyn RetryObserver {
        self.observer.as_ref()
    }

    pub(crate) fn should_retry(&self, error: &AttemptError<E>) -> bool {
        self.predicate.should_retry(error)
    }

    pub(crate) fn notify_retry(&self, attempt: u32, error: &AttemptError<E>) {
        (self.on_retry)(attempt, error)
    }
}

impl<E: 'static> Default for RetryConfig<E> {
    fn default() -> Self {
        RetryConfigBuilder::new().into_config()
    }
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            max_jitter: self.max_jitter,
            on_retry: Arc::clone(&self.on_retry),
            predicate: Arc::clone(&self.predicate),
            cancellation: self.cancellation.clone(),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("max_jitter", &self.max_jitter)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RetryConfig`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use watsonx_core::retry::{RetryConfig, TracingObserver};
///
/// let config = RetryConfig::<std::io::Error>::builder()
///     .with_max_attempts(5)
///     .with_backoff(Duration::from_millis(200))
///     .with_max_jitter(Duration::ZERO)
///     .with_retry_if(|err| err.status_code() != Some(400))
///     .with_on_retry(|attempt, err| eprintln!("attempt {attempt} failed: {err}"))
///     .with_observer(TracingObserver::new("generate"))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_attempts(), 5);
/// ```
pub struct RetryConfigBuilder<E> {
    max_attempts: u32,
    backoff: Duration,
    max_jitter: Duration,
    on_retry: Arc<OnRetryFn<E>>,
    predicate: Arc<dyn RetryPredicate<AttemptError<E>>>,
    cancellation: CancellationToken,
    observer: Arc<dyn RetryObserver>,
}

impl<E: 'static> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> RetryConfigBuilder<E> {
    /// Create a builder holding the defaults
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            max_jitter: DEFAULT_MAX_JITTER,
            on_retry: Arc::new(ignore_retry::<E>),
            predicate: Arc::new(AlwaysRetry),
            cancellation: CancellationToken::new(),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Take attempts, backoff and jitter from a policy
    pub fn with_policy(self, policy: &RetryPolicy) -> Self {
        self.with_max_attempts(policy.max_attempts)
            .with_backoff(policy.backoff())
            .with_max_jitter(policy.max_jitter())
    }

    /// Set the number of attempts (not additional retries)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the fixed wait between attempts
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the exclusive upper bound of the random extra wait; zero disables jitter
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Set the callback run before each wait
    pub fn with_on_retry<F>(mut self, on_retry: F) -> Self
    where
        F: Fn(u32, &AttemptError<E>) + Send + Sync + 'static,
    {
        self.on_retry = Arc::new(on_retry);
        self
    }

    /// Retry only when the closure returns true
    pub fn with_retry_if<F>(self, retry_if: F) -> Self
    where
        F: Fn(&AttemptError<E>) -> bool + Send + Sync + 'static,
    {
        self.with_predicate(ClosurePredicate::new(retry_if))
    }

    /// Retry only when the predicate accepts the error
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: RetryPredicate<AttemptError<E>> + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Set the cancellation token shared by the whole retry loop
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set the observer
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// Validate and build the config
    ///
    /// Fails with [`Error::InvalidRetryConfig`] when `max_attempts` is zero.
    pub fn build(self) -> Result<RetryConfig<E>> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_retry_config(
                "max attempts must be at least 1",
            ));
        }
        Ok(self.into_config())
    }

    fn into_config(self) -> RetryConfig<E> {
        RetryConfig {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            max_jitter: self.max_jitter,
            on_retry: self.on_retry,
            predicate: self.predicate,
            cancellation: self.cancellation,
            observer: self.observer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatsonxError;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Config = RetryConfig<io::Error>;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.backoff(), Duration::from_secs(1));
        assert_eq!(config.max_jitter(), Duration::from_secs(1));
        assert!(!config.cancellation_token().is_cancelled());

        let err = AttemptError::Api(WatsonxError::status_only(400));
        assert!(config.should_retry(&err));
    }

    #[test]
    fn test_each_option_overrides_one_field() {
        let config = Config::builder()
            .with_backoff(Duration::from_millis(10))
            .build()
            .unwrap();

        assert_eq!(config.backoff(), Duration::from_millis(10));
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.max_jitter(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = Config::builder().with_max_attempts(0).build();
        assert!(matches!(result, Err(Error::InvalidRetryConfig { .. })));
    }

    #[test]
    fn test_from_policy() {
        let policy = RetryPolicy {
            max_attempts: 7,
            backoff_ms: 20,
            max_jitter_ms: 0,
        };
        let config = Config::from_policy(&policy).unwrap();

        assert_eq!(config.max_attempts(), 7);
        assert_eq!(config.backoff(), Duration::from_millis(20));
        assert_eq!(config.max_jitter(), Duration::ZERO);

        let invalid = RetryPolicy {
            max_attempts: 0,
            ..policy
        };
        assert!(Config::from_policy(&invalid).is_err());
    }

    #[test]
    fn test_retry_if_and_on_retry_are_wired() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let config = Config::builder()
            .with_retry_if(|err| err.is_transport())
            .with_on_retry(move |attempt, _| {
                calls_clone.fetch_add(attempt, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        assert!(config.should_retry(&AttemptError::Transport(io::Error::other("reset"))));
        assert!(!config.should_retry(&AttemptError::Api(WatsonxError::status_only(500))));

        config.notify_retry(2, &AttemptError::Api(WatsonxError::status_only(500)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clone_shares_cancellation() {
        let token = CancellationToken::new();
        let config = Config::builder()
            .with_cancellation(token.clone())
            .build()
            .unwrap();
        let cloned = config.clone();

        token.cancel();
        assert!(config.cancellation_token().is_cancelled());
        assert!(cloned.cancellation_token().is_cancelled());
    }
}
