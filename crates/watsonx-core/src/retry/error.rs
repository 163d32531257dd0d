//! Error types for the retry engine
//!
//! [`AttemptError`] classifies the outcome of a single failed attempt.
//! [`RetryError`] names the terminal state a retry loop ended in and carries
//! the classification of the most recent attempt.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::models::WatsonxError;

/// Why a single attempt failed
#[derive(Debug)]
pub enum AttemptError<E> {
    /// The operation produced no response; the transport error is kept as-is
    Transport(E),

    /// A response arrived with a non-success status and was decoded
    Api(WatsonxError),
}

impl<E> AttemptError<E> {
    /// Status code of the failed response, if a response existed
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Api(err) => Some(err.status_code),
            AttemptError::Transport(_) => None,
        }
    }

    /// The decoded API error, if any
    pub fn api_error(&self) -> Option<&WatsonxError> {
        match self {
            AttemptError::Api(err) => Some(err),
            AttemptError::Transport(_) => None,
        }
    }

    /// The transport error, if any
    pub fn transport_error(&self) -> Option<&E> {
        match self {
            AttemptError::Transport(err) => Some(err),
            AttemptError::Api(_) => None,
        }
    }

    /// Whether the attempt failed before a response was obtained
    pub fn is_transport(&self) -> bool {
        matches!(self, AttemptError::Transport(_))
    }
}

impl<E: fmt::Display> fmt::Display for AttemptError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(err) => write!(f, "transport error: {}", err),
            AttemptError::Api(err) => write!(f, "{}", err),
        }
    }
}

impl<E: Error + 'static> Error for AttemptError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AttemptError::Transport(err) => Some(err),
            AttemptError::Api(err) => Some(err),
        }
    }
}

/// Terminal failure of a retry loop
///
/// Generic over `E`, the error of the individual attempts.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Time spent across all attempts and waits
        total_duration: Duration,
    },

    /// The retry predicate rejected an error, so no further attempt was made
    Aborted {
        /// Number of attempts made, including the rejected one
        attempts: u32,
        /// The rejected error
        source: E,
    },

    /// The cancellation token fired before an attempt or during a wait
    Cancelled {
        /// Number of attempts completed before cancellation
        attempts: u32,
        /// The error of the last completed attempt, if any
        last_error: Option<E>,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s: {}",
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::Aborted { attempts, source } => {
                write!(
                    f,
                    "non-retryable error on attempt {}: {}",
                    attempts, source
                )
            }
            RetryError::Cancelled {
                attempts,
                last_error,
            } => {
                if let Some(err) = last_error {
                    write!(f, "retry cancelled after {} attempts: {}", attempts, err)
                } else {
                    write!(f, "retry cancelled after {} attempts", attempts)
                }
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { source, .. } => Some(source),
            RetryError::Cancelled {
                last_error: Some(err),
                ..
            } => Some(err),
            RetryError::Cancelled {
                last_error: None, ..
            } => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new aborted error
    pub fn aborted(attempts: u32, source: E) -> Self {
        RetryError::Aborted { attempts, source }
    }

    /// Create a new cancelled error
    pub fn cancelled(attempts: u32, last_error: Option<E>) -> Self {
        RetryError::Cancelled {
            attempts,
            last_error,
        }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempts, .. } => *attempts,
            RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Check if this error indicates all attempts were used up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if the retry predicate stopped the loop
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// Check if this error indicates cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    /// Get the error of the most recent attempt, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { source, .. } => Some(source),
            RetryError::Cancelled { last_error, .. } => last_error,
        }
    }

    /// Get a reference to the error of the most recent attempt
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { source, .. } => Some(source),
            RetryError::Cancelled { last_error, .. } => last_error.as_ref(),
        }
    }

    /// Map the error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::Aborted { attempts, source } => RetryError::Aborted {
                attempts,
                source: f(source),
            },
            RetryError::Cancelled {
                attempts,
                last_error,
            } => RetryError::Cancelled {
                attempts,
                last_error: last_error.map(f),
            },
        }
    }
}

impl<E> RetryError<AttemptError<E>> {
    /// The decoded API error of the most recent attempt, if it had a response
    pub fn api_error(&self) -> Option<&WatsonxError> {
        self.source_ref().and_then(AttemptError::api_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exhausted_error() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            io::Error::new(io::ErrorKind::TimedOut, "timeout"),
            Duration::from_secs(5),
        );

        assert!(err.is_exhausted());
        assert!(!err.is_cancelled());
        assert!(!err.is_aborted());
        assert_eq!(err.attempts(), 3);
    }

    #[test]
    fn test_aborted_error() {
        let err: RetryError<io::Error> =
            RetryError::aborted(2, io::Error::new(io::ErrorKind::NotFound, "not found"));

        assert!(err.is_aborted());
        assert_eq!(err.attempts(), 2);
        assert!(err.to_string().contains("attempt 2"));
    }

    #[test]
    fn test_cancelled_error() {
        let err: RetryError<io::Error> = RetryError::cancelled(0, None);

        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 0);
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "retry cancelled after 0 attempts");
    }

    #[test]
    fn test_into_source() {
        let err: RetryError<String> =
            RetryError::exhausted(3, "original error".to_string(), Duration::from_secs(1));
        assert_eq!(err.into_source(), Some("original error".to_string()));

        let err: RetryError<String> = RetryError::cancelled(1, Some("last".to_string()));
        assert_eq!(err.into_source(), Some("last".to_string()));

        let err: RetryError<String> = RetryError::cancelled(1, None);
        assert_eq!(err.into_source(), None);
    }

    #[test]
    fn test_map_err() {
        let err: RetryError<i32> = RetryError::aborted(1, 42);

        let mapped = err.map_err(|n| format!("error code: {}", n));
        assert!(matches!(mapped, RetryError::Aborted { source, .. } if source == "error code: 42"));
    }

    #[test]
    fn test_display() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            io::Error::new(io::ErrorKind::TimedOut, "connection timeout"),
            Duration::from_secs(5),
        );

        let display = format!("{}", err);
        assert!(display.contains("retry exhausted"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("connection timeout"));
    }

    #[test]
    fn test_attempt_error_accessors() {
        let api: AttemptError<io::Error> = AttemptError::Api(WatsonxError::status_only(429));
        assert_eq!(api.status_code(), Some(429));
        assert!(api.api_error().is_some());
        assert!(!api.is_transport());
        assert_eq!(api.to_string(), "watsonx error (429)");

        let transport: AttemptError<io::Error> =
            AttemptError::Transport(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(transport.status_code(), None);
        assert!(transport.is_transport());
        assert_eq!(
            transport.transport_error().unwrap().kind(),
            io::ErrorKind::ConnectionRefused
        );
        assert!(transport.source().is_some());
    }

    #[test]
    fn test_retry_error_api_error() {
        let err: RetryError<AttemptError<io::Error>> = RetryError::exhausted(
            3,
            AttemptError::Api(WatsonxError::status_only(503)),
            Duration::from_millis(20),
        );
        assert_eq!(err.api_error().unwrap().status_code, 503);
    }
}
