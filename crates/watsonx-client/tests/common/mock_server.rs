//! Mock server helpers
//!
//! Provides utilities for setting up wiremock mock servers that fail,
//! recover, or reject requests the way the watsonx API does.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Set up an endpoint that always answers with `status` and `body`
pub async fn mock_response(
    server: &MockServer,
    http_method: &str,
    endpoint: &str,
    status: u16,
    body: &str,
) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Set up an endpoint that fails N times before succeeding
///
/// The first `fail_count` requests return `fail_status` with an empty body,
/// subsequent requests return 200 with `body`.
pub async fn mock_flaky_endpoint(
    server: &MockServer,
    http_method: &str,
    endpoint: &str,
    fail_count: u64,
    fail_status: u16,
    body: &str,
) {
    // First N requests fail
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(fail_status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    // Subsequent requests succeed
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Set up an endpoint that always fails with `status` and no body
pub async fn mock_failing_endpoint(
    server: &MockServer,
    http_method: &str,
    endpoint: &str,
    status: u16,
) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Bodies of every request the server received, in order
pub async fn received_bodies(server: &MockServer) -> Vec<Vec<u8>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.body)
        .collect()
}

/// Number of requests the server received
pub async fn received_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}
