//! # watsonx-client
//!
//! A `reqwest` wrapper that sends watsonx requests through the retry engine
//! from `watsonx-core`:
//! - Request bodies are buffered once and replayed on every attempt
//! - Non-success responses are decoded into structured watsonx errors
//! - Retry settings come from code, `~/.watsonx/retry.yaml` or the environment

pub mod body;
pub mod client;
pub mod error;

pub use body::ReusableBody;
pub use client::HttpClient;
pub use error::{ClientError, RequestRetryError};
