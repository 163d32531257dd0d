//! # watsonx-core
//!
//! Core library for resilient watsonx API calls providing:
//! - Retry execution engine with fixed backoff, jitter and cancellation
//! - Decoding of the watsonx error envelope into structured errors
//! - Retry policy configuration (YAML file and environment variables)

pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod types;

pub use config::RetryConfigLoader;
pub use error::{Error, Result};
pub use models::{decode_api_error, WatsonxError};
pub use types::RetryPolicy;
