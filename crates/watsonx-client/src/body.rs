//! Replayable request bodies
//!
//! A `reqwest::Body` can be sent once. To send the same request on every
//! attempt the body is read into memory up front and handed out as a fresh
//! `Body` per attempt. There is no size cap, so this is not meant for
//! unbounded streams.

use bytes::Bytes;
use http_body_util::BodyExt;

use crate::error::ClientError;

/// A request body captured once and replayed on every attempt
#[derive(Debug, Clone, Default)]
pub struct ReusableBody {
    bytes: Option<Bytes>,
}

impl ReusableBody {
    /// Take the body out of `request` and buffer it
    ///
    /// A request without a body yields no body on every call. Streaming
    /// bodies are read to the end. A read failure is returned as
    /// [`ClientError::BodyReplay`].
    pub async fn prepare(request: &mut reqwest::Request) -> Result<Self, ClientError> {
        let Some(body) = request.body_mut().take() else {
            return Ok(Self { bytes: None });
        };

        let bytes = body
            .collect()
            .await
            .map_err(ClientError::BodyReplay)?
            .to_bytes();

        tracing::trace!(len = bytes.len(), "buffered request body for replay");

        Ok(Self { bytes: Some(bytes) })
    }

    /// A fresh body over the captured bytes
    pub fn body(&self) -> Option<reqwest::Body> {
        // Cloning `Bytes` shares the buffer
        self.bytes.clone().map(reqwest::Body::from)
    }

    /// The captured bytes, if the request had a body
    pub fn bytes(&self) -> Option<&Bytes> {
        self.bytes.as_ref()
    }
}
