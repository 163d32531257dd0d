//! Retry execution engine
//!
//! Drives the attempt loop: invoke, classify, ask the predicate, notify, wait
//! (racing cancellation), repeat.

use std::error::Error;
use std::future::Future;
use std::time::Instant;

use crate::models::{decode_api_error, ApiResponse, SUCCESS_STATUS};

use super::config::RetryConfig;
use super::error::{AttemptError, RetryError};
use super::strategies::backoff_delay;

/// Invoke `op` until it succeeds, the predicate gives up, the attempts run
/// out, or the cancellation token fires
///
/// An attempt succeeds only when the operation returns a response whose
/// status is [`SUCCESS_STATUS`]. Any other response is decoded into a
/// [`WatsonxError`](crate::models::WatsonxError); a transport error is kept
/// as-is. The returned error always carries the classification of the most
/// recent attempt.
///
/// Cancellation is checked before every attempt and raced against every
/// wait. It never interrupts an attempt already in flight.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use watsonx_core::retry::{retry, RetryConfig};
///
/// async fn example(client: reqwest::Client) {
///     let config = RetryConfig::builder()
///         .with_backoff(Duration::from_millis(500))
///         .build()
///         .unwrap();
///
///     let result = retry(
///         || client.get("https://us-south.ml.cloud.ibm.com/ml/v1/foundation_model_specs").send(),
///         &config,
///     )
///     .await;
///
///     match result {
///         Ok(response) => println!("status {}", response.status()),
///         Err(err) => eprintln!("{}", err),
///     }
/// }
/// ```
pub async fn retry<R, E, F, Fut>(
    mut op: F,
    config: &RetryConfig<E>,
) -> Result<R, RetryError<AttemptError<E>>>
where
    R: ApiResponse,
    E: Error + Send + Sync + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts();
    let observer = config.observer();
    let token = config.cancellation_token();

    let mut last_error: Option<AttemptError<E>> = None;
    let mut attempt: u32 = 0;

    loop {
        if token.is_cancelled() {
            observer.on_cancelled(attempt, last_error.as_ref().map(|e| e as &dyn Error));
            return Err(RetryError::cancelled(attempt, last_error));
        }

        attempt += 1;
        observer.on_attempt_start(attempt, max_attempts);

        let err = match op().await {
            Ok(response) if response.status_code() == SUCCESS_STATUS => {
                observer.on_success(attempt, start.elapsed());
                return Ok(response);
            }
            Ok(mut response) => AttemptError::Api(decode_api_error(Some(&mut response)).await),
            Err(err) => AttemptError::Transport(err),
        };

        if !config.should_retry(&err) {
            observer.on_aborted(attempt, &err);
            return Err(RetryError::aborted(attempt, err));
        }

        if attempt >= max_attempts {
            observer.on_exhausted(attempt, &err);
            return Err(RetryError::exhausted(attempt, err, start.elapsed()));
        }

        config.notify_retry(attempt, &err);

        let delay = backoff_delay(config.backoff(), config.max_jitter());
        observer.on_attempt_failed(attempt, &err, delay);

        tokio::select! {
            biased;

            _ = token.cancelled() => {
                observer.on_cancelled(attempt, Some(&err as &dyn Error));
                return Err(RetryError::cancelled(attempt, Some(err)));
            }
            _ = tokio::time::sleep(delay) => {}
        }

        last_error = Some(err);
    }
}
