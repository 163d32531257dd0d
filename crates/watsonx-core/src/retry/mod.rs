//! Retry engine for request/response operations
//!
//! This module retries an operation that returns a response, treating
//! anything but a success status as a failure that is decoded into a
//! structured [`WatsonxError`](crate::models::WatsonxError).
//!
//! # Features
//!
//! - Bounded attempts with fixed backoff and uniform jitter
//! - Retry predicates over the classified error
//! - An `on_retry` callback before every wait
//! - Cooperative cancellation before attempts and during waits
//! - Observable retry loops via the `RetryObserver` trait, with a built-in
//!   `TracingObserver` for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use watsonx_core::retry::{retry, AttemptError, RetryConfig, RetryError};
//!
//! async fn example(
//!     client: reqwest::Client,
//! ) -> Result<reqwest::Response, RetryError<AttemptError<reqwest::Error>>> {
//!     let config = RetryConfig::default();
//!
//!     retry(|| client.get("https://example.com/ml/v1/text/generation").send(), &config).await
//! }
//! ```

mod config;
mod error;
mod executor;
mod observer;
mod strategies;

pub use config::{OnRetryFn, RetryConfig, RetryConfigBuilder};
pub use error::{AttemptError, RetryError};
pub use executor::retry;
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use strategies::{
    backoff_delay, AlwaysRetry, ClosurePredicate, HttpStatusError, HttpStatusPredicate,
    NeverRetry, RetryPredicate,
};
