//! Response abstraction used by the retry engine and the error decoder

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{ResponseBuilderExt, Url};
use std::convert::Infallible;
use std::error::Error;

/// The one status code the retry engine treats as success
pub const SUCCESS_STATUS: u16 = 200;

/// A response the retry engine can classify
///
/// The engine only needs the status code and a way to read the body without
/// taking it away from whoever receives the response next. Bodies are
/// buffered in memory and rewrapped; implementations must not rely on the
/// underlying stream being seekable.
#[async_trait]
pub trait ApiResponse: Send {
    /// Error raised while reading the body
    type BodyError: Error + Send + Sync + 'static;

    /// The numeric status code of the response
    fn status_code(&self) -> u16;

    /// Read the entire body and put an equivalent, unread body back in place
    ///
    /// After this returns `Ok`, reading the body again yields the same bytes.
    /// After an `Err` the body may be empty.
    async fn buffer_body(&mut self) -> Result<Bytes, Self::BodyError>;
}

#[async_trait]
impl ApiResponse for reqwest::Response {
    type BodyError = reqwest::Error;

    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    async fn buffer_body(&mut self) -> Result<Bytes, reqwest::Error> {
        let url = self.url().clone();
        let placeholder = reqwest::Response::from(http::Response::new(Bytes::new()));
        let taken = std::mem::replace(self, placeholder);

        let (parts, body) = http::Response::<reqwest::Body>::from(taken).into_parts();
        let result = body.collect().await.map(|collected| collected.to_bytes());

        let restored = match &result {
            Ok(bytes) => bytes.clone(),
            Err(_) => Bytes::new(),
        };
        *self = rewrap(parts, url, restored);

        result
    }
}

/// Rebuild a reqwest response from its parts, a buffered body and its URL
///
/// The http conversion drops the response URL, so it is put back through
/// the response builder extension.
fn rewrap(parts: http::response::Parts, url: Url, body: Bytes) -> reqwest::Response {
    let mut response = http::Response::from_parts(parts, body);

    let mut builder = http::Response::builder().url(url);
    if let Some(extensions) = builder.extensions_mut() {
        response
            .extensions_mut()
            .extend(std::mem::take(extensions));
    }

    reqwest::Response::from(response)
}

#[async_trait]
impl ApiResponse for http::Response<Bytes> {
    type BodyError = Infallible;

    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    async fn buffer_body(&mut self) -> Result<Bytes, Infallible> {
        // Already in memory; cloning `Bytes` shares the buffer.
        Ok(self.body().clone())
    }
}
