//! Structured watsonx API errors
//!
//! Non-success responses carry a JSON envelope:
//!
//! ```text
//! { "errors": [ { "code": "...", "message": "...", "more_info": "..." } ], "trace": "..." }
//! ```
//!
//! [`decode_api_error`] turns such a response into a [`WatsonxError`]. It
//! never fails: bodies that cannot be read or parsed degrade to an error that
//! only carries the status code.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::response::ApiResponse;

/// A single entry of the `errors` array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    /// Machine-readable error code, e.g. `invalid_request`
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    /// Human-readable description
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Pointer to further documentation
    #[serde(deserialize_with = "null_as_default")]
    pub more_info: String,
}

/// Wire shape of an error response body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    errors: Vec<ErrorDetail>,
    #[serde(deserialize_with = "null_as_default")]
    trace: String,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A decoded non-success response
///
/// `status_code` is 0 when no response existed at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatsonxError {
    /// Status code of the failed attempt
    pub status_code: u16,
    /// Error details in document order
    pub errors: Vec<ErrorDetail>,
    /// Server-side trace identifier
    pub trace: String,
}

impl WatsonxError {
    /// An error that carries only a status code
    pub fn status_only(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    /// Build an error from a status code and a raw body
    ///
    /// Empty bodies and bodies that are not a valid error envelope (invalid
    /// JSON as well as JSON of another shape) yield a status-only error.
    ///
    /// Parsing is lenient: keys match case-insensitively, invalid UTF-8 is
    /// replaced with U+FFFD, and the last of duplicate keys wins.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::status_only(status_code);
        }

        match parse_envelope(body) {
            Ok(envelope) => Self {
                status_code,
                errors: envelope.errors,
                trace: envelope.trace,
            },
            Err(err) => {
                tracing::debug!(
                    status = status_code,
                    error = %err,
                    "response body is not a watsonx error envelope"
                );
                Self::status_only(status_code)
            }
        }
    }

    /// The first error detail, if any
    pub fn first_detail(&self) -> Option<&ErrorDetail> {
        self.errors.first()
    }
}

fn parse_envelope(body: &[u8]) -> serde_json::Result<ErrorEnvelope> {
    let text = String::from_utf8_lossy(body);
    // Map keys collapse here, so a repeated key keeps its last value
    let value: Value = serde_json::from_str(&text)?;
    serde_json::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), lowercase_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

impl fmt::Display for WatsonxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(detail) => write!(
                f,
                "watsonx error ({}): {} - {}",
                self.status_code, detail.code, detail.message
            ),
            None => write!(f, "watsonx error ({})", self.status_code),
        }
    }
}

impl std::error::Error for WatsonxError {}

/// Decode a failed response into a [`WatsonxError`]
///
/// The body is read once through [`ApiResponse::buffer_body`], which leaves an
/// equivalent unread body on the response, so callers can still consume it.
/// `None` stands for a transport failure without any response and yields a
/// zero status.
pub async fn decode_api_error<R: ApiResponse>(response: Option<&mut R>) -> WatsonxError {
    let Some(response) = response else {
        return WatsonxError::default();
    };

    let status_code = response.status_code();
    match response.buffer_body().await {
        Ok(body) => WatsonxError::from_body(status_code, &body),
        Err(err) => {
            tracing::debug!(
                status = status_code,
                error = %err,
                "failed to read error response body"
            );
            WatsonxError::status_only(status_code)
        }
    }
}
