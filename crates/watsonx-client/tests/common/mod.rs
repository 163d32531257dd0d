//! Common test infrastructure for watsonx-client tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Paths, payloads and the error envelope
//! - `mock_server`: Wiremock setup helpers for flaky and failing endpoints

#![allow(dead_code)]

pub mod constants;
pub mod mock_server;

pub use constants::*;
pub use mock_server::*;

use std::time::Duration;
use watsonx_client::HttpClient;
use watsonx_core::types::RetryPolicy;

/// Install a tracing subscriber that writes through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Retry policy with short, deterministic waits
pub fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_ms: 10,
        max_jitter_ms: 0,
    }
}

/// Client using `quick_policy`
pub fn quick_client(max_attempts: u32) -> HttpClient {
    HttpClient::new().with_policy(quick_policy(max_attempts))
}

/// Build a POST request to `path` on the mock server with a fixed body
pub fn post_request(server_uri: &str, path: &str, body: &'static str) -> reqwest::Request {
    reqwest::Client::new()
        .post(format!("{}{}", server_uri, path))
        .header("content-type", "application/json")
        .timeout(Duration::from_secs(10))
        .body(body)
        .build()
        .expect("valid request")
}
