//! Retrying HTTP client
//!
//! [`HttpClient`] wraps a `reqwest::Client` and sends requests through the
//! watsonx retry engine, replaying the request body on every attempt.
//!
//! # Example
//!
//! ```no_run
//! use watsonx_client::HttpClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpClient::from_env()?;
//!
//!     let request = reqwest::Client::new()
//!         .post("https://us-south.ml.cloud.ibm.com/ml/v1/text/generation")
//!         .body(r#"{"input":"Hello"}"#)
//!         .build()?;
//!
//!     match client.execute_with_retry(request).await {
//!         Ok(response) => println!("{}", response.text().await?),
//!         Err(err) => match err.api_error() {
//!             Some(api) => eprintln!("watsonx rejected the request: {}", api),
//!             None => eprintln!("request failed: {}", err),
//!         },
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use watsonx_core::config::RetryConfigLoader;
use watsonx_core::retry::{retry, RetryConfig, RetryObserver, TracingObserver};
use watsonx_core::types::RetryPolicy;

use crate::body::ReusableBody;
use crate::error::ClientError;

/// Operation name used by the default tracing observer
pub const DEFAULT_OPERATION: &str = "watsonx-request";

/// HTTP client that retries failed watsonx calls
#[derive(Clone)]
pub struct HttpClient {
    /// Underlying transport
    client: reqwest::Client,

    /// Attempts, backoff and jitter for `execute_with_retry`
    policy: RetryPolicy,

    /// Observer attached to every retry loop
    observer: Arc<dyn RetryObserver>,

    /// Token shared by every retry loop started from this client
    cancellation: CancellationToken,
}

impl HttpClient {
    /// Create a client with the default retry policy
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a client whose retry policy comes from `~/.watsonx/retry.yaml`
    /// and `WATSONX_RETRY_*` environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        let policy = RetryConfigLoader::new()?.load_retry_policy()?;
        Ok(Self::new().with_policy(policy))
    }

    /// Wrap an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingObserver::new(DEFAULT_OPERATION)),
            cancellation: CancellationToken::new(),
        }
    }

    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the default tracing observer
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// Set the token that cancels retry loops started from this client
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The underlying `reqwest::Client`
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Build the engine config for this client's policy, observer and token
    pub fn retry_config(&self) -> Result<RetryConfig<reqwest::Error>, ClientError> {
        let config = RetryConfig::builder()
            .with_policy(&self.policy)
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancellation.clone())
            .build()?;
        Ok(config)
    }

    /// Send the request once, without retry or error decoding
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, ClientError> {
        self.client
            .execute(request)
            .await
            .map_err(ClientError::Transport)
    }

    /// Send the request, retrying with this client's policy
    pub async fn execute_with_retry(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, ClientError> {
        let config = self.retry_config()?;
        self.execute_with_config(request, &config).await
    }

    /// Send the request, retrying with a caller-built config
    ///
    /// The body is read once before the first attempt; if that fails no
    /// attempt is made.
    pub async fn execute_with_config(
        &self,
        mut request: reqwest::Request,
        config: &RetryConfig<reqwest::Error>,
    ) -> Result<reqwest::Response, ClientError> {
        let body = ReusableBody::prepare(&mut request).await?;

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            max_attempts = config.max_attempts(),
            "sending request with retry"
        );

        let response = retry(
            || self.client.execute(rebuild(&request, body.body())),
            config,
        )
        .await?;

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("policy", &self.policy)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Clone a body-less template into a new request carrying `body`
fn rebuild(template: &reqwest::Request, body: Option<reqwest::Body>) -> reqwest::Request {
    // Only a streaming body makes try_clone fail, and the template has none
    let mut request = template.try_clone().unwrap_or_else(|| copy_parts(template));
    *request.body_mut() = body;
    request
}

fn copy_parts(template: &reqwest::Request) -> reqwest::Request {
    let mut request = reqwest::Request::new(template.method().clone(), template.url().clone());
    *request.headers_mut() = template.headers().clone();
    *request.timeout_mut() = template.timeout().copied();
    *request.version_mut() = template.version();
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, AUTHORIZATION};
    use reqwest::{Method, Url, Version};
    use std::time::Duration;

    #[test]
    fn test_rebuild_copies_request_parts() {
        let url = Url::parse("http://localhost/ml/v1/text/generation?version=2024-05-01").unwrap();
        let mut template = reqwest::Request::new(Method::POST, url.clone());
        template
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        *template.timeout_mut() = Some(Duration::from_secs(30));
        *template.version_mut() = Version::HTTP_11;

        let rebuilt = rebuild(&template, Some(reqwest::Body::from("payload")));

        assert_eq!(rebuilt.method(), &Method::POST);
        assert_eq!(rebuilt.url(), &url);
        assert_eq!(rebuilt.headers().get(AUTHORIZATION).unwrap(), "Bearer token");
        assert_eq!(rebuilt.timeout(), Some(&Duration::from_secs(30)));
        assert_eq!(rebuilt.version(), Version::HTTP_11);
        assert_eq!(rebuilt.body().and_then(|b| b.as_bytes()), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn test_rebuild_after_prepare_carries_every_part() {
        let mut template = reqwest::Client::new()
            .post("http://localhost/ml/v1/text/generation")
            .bearer_auth("token")
            .timeout(Duration::from_secs(5))
            .body("payload")
            .build()
            .unwrap();
        let body = ReusableBody::prepare(&mut template).await.unwrap();

        let expected = template.try_clone().unwrap();
        for _ in 0..2 {
            let rebuilt = rebuild(&template, body.body());

            assert_eq!(rebuilt.method(), expected.method());
            assert_eq!(rebuilt.url(), expected.url());
            assert_eq!(rebuilt.headers(), expected.headers());
            assert_eq!(rebuilt.timeout(), expected.timeout());
            assert_eq!(rebuilt.version(), expected.version());
            assert_eq!(rebuilt.body().and_then(|b| b.as_bytes()), Some(&b"payload"[..]));
        }

        // The template itself stays body-less
        assert!(template.body().is_none());
    }

    #[test]
    fn test_copy_parts_matches_clone() {
        let template = reqwest::Client::new()
            .get("http://localhost/ml/v1/foundation_model_specs")
            .header("x-request-id", "abc")
            .build()
            .unwrap();

        let copied = copy_parts(&template);
        assert_eq!(copied.url(), template.url());
        assert_eq!(copied.headers(), template.headers());
    }

    #[test]
    fn test_default_policy() {
        let client = HttpClient::new();
        assert_eq!(client.policy(), &RetryPolicy::default());

        let config = client.retry_config().unwrap();
        assert_eq!(config.max_attempts(), 3);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let client = HttpClient::new().with_policy(RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        });

        assert!(matches!(client.retry_config(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_cancellation_token_shared() {
        let token = CancellationToken::new();
        let client = HttpClient::new().with_cancellation(token.clone());

        token.cancel();
        assert!(client.retry_config().unwrap().cancellation_token().is_cancelled());
    }
}
