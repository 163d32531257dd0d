//! Retry delays and predicates
//!
//! The wait between attempts is a fixed backoff plus a uniformly random
//! jitter. Predicates decide whether a classified error is worth another
//! attempt.

use rand::Rng;
use std::time::Duration;

use crate::models::WatsonxError;

use super::error::AttemptError;

/// Compute the wait before the next attempt
///
/// Returns `backoff + uniform[0, max_jitter)`. A zero `max_jitter` adds
/// nothing.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use watsonx_core::retry::backoff_delay;
///
/// let delay = backoff_delay(Duration::from_millis(100), Duration::ZERO);
/// assert_eq!(delay, Duration::from_millis(100));
///
/// let delay = backoff_delay(Duration::from_millis(100), Duration::from_millis(50));
/// assert!(delay >= Duration::from_millis(100));
/// assert!(delay < Duration::from_millis(150));
/// ```
pub fn backoff_delay(backoff: Duration, max_jitter: Duration) -> Duration {
    backoff.saturating_add(jitter(max_jitter))
}

/// A uniformly random duration in `[0, max_jitter)`
fn jitter(max_jitter: Duration) -> Duration {
    let bound = u64::try_from(max_jitter.as_nanos()).unwrap_or(u64::MAX);
    if bound == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rand::rng().random_range(0..bound))
}

/// A predicate that determines whether an error should be retried
///
/// # Example
///
/// ```rust
/// use watsonx_core::retry::{AttemptError, RetryPredicate};
///
/// struct RetryTransportOnly;
///
/// impl RetryPredicate<AttemptError<std::io::Error>> for RetryTransportOnly {
///     fn should_retry(&self, error: &AttemptError<std::io::Error>) -> bool {
///         error.is_transport()
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all errors are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that never retries (no errors are retryable)
#[derive(Debug, Clone, Copy)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate that uses a closure to determine retryability
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// A predicate for HTTP status codes
#[derive(Debug, Clone)]
pub struct HttpStatusPredicate {
    /// Status codes that should be retried
    retryable_codes: Vec<u16>,
}

impl HttpStatusPredicate {
    /// Create a predicate with default retryable status codes
    ///
    /// Default retryable codes: 408, 425, 429, 500, 502, 503, 504
    pub fn default_http() -> Self {
        Self {
            retryable_codes: vec![408, 425, 429, 500, 502, 503, 504],
        }
    }

    /// Create a predicate with custom retryable status codes
    pub fn with_codes(codes: Vec<u16>) -> Self {
        Self {
            retryable_codes: codes,
        }
    }

    /// Check if a status code is retryable
    pub fn is_retryable_code(&self, code: u16) -> bool {
        self.retryable_codes.contains(&code)
    }
}

/// A trait for errors that contain HTTP status information
pub trait HttpStatusError {
    /// Get the HTTP status code if available
    fn status_code(&self) -> Option<u16>;
}

impl HttpStatusError for WatsonxError {
    fn status_code(&self) -> Option<u16> {
        // Zero marks "no response"
        (self.status_code != 0).then_some(self.status_code)
    }
}

impl<E> HttpStatusError for AttemptError<E> {
    fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Api(err) => HttpStatusError::status_code(err),
            AttemptError::Transport(_) => None,
        }
    }
}

impl<E: HttpStatusError> RetryPredicate<E> for HttpStatusPredicate {
    fn should_retry(&self, error: &E) -> bool {
        error
            .status_code()
            .map(|code| self.is_retryable_code(code))
            .unwrap_or(true) // No status means no response; assume transient
    }
}
