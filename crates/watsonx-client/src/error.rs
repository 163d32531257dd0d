//! Error types for watsonx-client

use thiserror::Error;
use watsonx_core::models::WatsonxError;
use watsonx_core::retry::{AttemptError, RetryError};

/// Terminal failure of a retried request
pub type RequestRetryError = RetryError<AttemptError<reqwest::Error>>;

/// Errors returned by [`crate::HttpClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request body could not be read for replay; no attempt was made
    #[error("Failed to read request body for replay: {0}")]
    BodyReplay(#[source] reqwest::Error),

    /// A single, non-retried send failed
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The retry loop ended without a successful response
    #[error(transparent)]
    Retry(#[from] RequestRetryError),

    /// Retry settings could not be loaded or are invalid
    #[error(transparent)]
    Config(#[from] watsonx_core::Error),
}

impl ClientError {
    /// The decoded API error of the final attempt, if it received a response
    pub fn api_error(&self) -> Option<&WatsonxError> {
        match self {
            ClientError::Retry(err) => err.api_error(),
            _ => None,
        }
    }

    /// Number of attempts made before this error, zero when none were made
    pub fn attempts(&self) -> u32 {
        match self {
            ClientError::Retry(err) => err.attempts(),
            ClientError::Transport(_) => 1,
            ClientError::BodyReplay(_) | ClientError::Config(_) => 0,
        }
    }
}
