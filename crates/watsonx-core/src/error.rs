//! Error types for watsonx-core

use thiserror::Error;

/// Result type alias using watsonx-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and setup errors
///
/// Failures of a retried operation are not reported through this type; see
/// [`crate::retry::RetryError`] and [`crate::models::WatsonxError`].
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration format or value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Retry settings violate an invariant
    #[error("Invalid retry configuration: {message}")]
    InvalidRetryConfig { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid retry config error
    pub fn invalid_retry_config(message: impl Into<String>) -> Self {
        Self::InvalidRetryConfig {
            message: message.into(),
        }
    }
}
