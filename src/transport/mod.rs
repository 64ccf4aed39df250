//! Transport capability consumed by the dispatch engine.
//!
//! The engine never opens connections itself. It builds a [`TransportRequest`]
//! and hands it to a [`Transport`], which answers with a status, headers and a
//! body stream. Connection pooling, TLS handshakes, redirects and HTTP/2
//! multiplexing all live behind this trait.
//!
//! - [`ReqwestTransport`] - bundled implementation backed by `reqwest`
//! - any other implementation can be injected, e.g. test doubles

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, stream};
use thiserror::Error;

use crate::config::HeaderList;
use crate::error::BoxError;
use crate::response::ResponseHeaders;

/// Streamed response body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// HTTP methods supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `HEAD`
    Head,
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared request, built per call and never shared.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Request method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Default headers merged with per-call headers.
    pub headers: HeaderList,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Returns the first value of a request header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw transport response: status, headers and an unread body stream.
pub struct TransportResponse {
    status: u16,
    headers: ResponseHeaders,
    body: BodyStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Creates a response with a streamed body.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a response whose body is already in memory.
    #[must_use]
    pub fn from_bytes(status: u16, headers: ResponseHeaders, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let chunks: Vec<Result<Bytes, TransportError>> =
            if body.is_empty() { Vec::new() } else { vec![Ok(body)] };
        Self::new(status, headers, Box::pin(stream::iter(chunks)))
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Splits the response into status, headers and body stream.
    #[must_use]
    pub fn into_parts(self) -> (u16, ResponseHeaders, BodyStream) {
        (self.status, self.headers, self.body)
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] produced by the body stream.
    pub async fn collect_body(self) -> Result<(u16, ResponseHeaders, Bytes), TransportError> {
        let (status, headers, mut body) = self.into_parts();
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok((status, headers, buffer.freeze()))
    }
}

/// The transport capability.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends `request` and returns the response head with an unread body.
    ///
    /// Non-2xx statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).submit(request).await
    }
}

/// Errors produced by a transport.
///
/// The native error of the underlying client stays reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, header or method).
    #[error("invalid request for {url}: {reason}")]
    InvalidRequest {
        /// The request URL.
        url: String,
        /// What was invalid.
        reason: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// Connection, DNS, TLS or protocol failure.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The native transport error.
        #[source]
        source: BoxError,
    },

    /// The response body stream failed part way.
    #[error("error reading response body from {url}: {source}")]
    Body {
        /// The request URL.
        url: String,
        /// The native transport error.
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// Creates an invalid-request error.
    pub fn invalid_request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates a body stream error.
    pub fn body(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Body {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Returns true for timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_body_concatenates_chunks() {
        let chunks: Vec<Result<Bytes, TransportError>> =
            vec![Ok(Bytes::from_static(b"hello ")), Ok(Bytes::from_static(b"world"))];
        let response = TransportResponse::new(
            200,
            [("Content-Length", "11")].into_iter().collect(),
            Box::pin(stream::iter(chunks)),
        );
        let (status, headers, body) = response.collect_body().await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(headers.content_length(), Some(11));
        assert_eq!(&body[..], b"hello world");
    }

    #[tokio::test]
    async fn test_collect_body_surfaces_stream_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(TransportError::body(
                "https://api.test/x",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
            )),
        ];
        let response =
            TransportResponse::new(200, ResponseHeaders::new(), Box::pin(stream::iter(chunks)));
        let error = response.collect_body().await.unwrap_err();
        assert!(matches!(error, TransportError::Body { .. }));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[tokio::test]
    async fn test_from_bytes_empty_body() {
        let response = TransportResponse::from_bytes(204, ResponseHeaders::new(), Bytes::new());
        let (status, _, body) = response.collect_body().await.unwrap();
        assert_eq!(status, 204);
        assert!(body.is_empty());
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = TransportRequest {
            method: Method::Post,
            url: "https://api.test/items".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.method.to_string(), "POST");
    }

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::invalid_request("nope", "relative URL without a base");
        assert!(error.to_string().contains("relative URL"));
        assert!(TransportError::timeout("https://api.test").is_timeout());
    }
}
