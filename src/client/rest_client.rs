//! Text client.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::instrument;

use super::{Engine, ResponseHandle, RestRequest};
use crate::config::{DefaultHeaders, TransportConfig};
use crate::error::RestError;
use crate::response::{FileResponse, NoBodyResponse, StringResponse};
use crate::transport::{ReqwestTransport, Transport};

/// REST client exchanging plain text bodies.
///
/// Designed to be created once and shared: clones share the transport (and
/// its connection pool) and the default-header set.
///
/// # Example
///
/// ```no_run
/// use restclient_core::client::RestClient;
/// use restclient_core::response::ResponseMeta;
///
/// # async fn example() -> Result<(), restclient_core::error::RestError> {
/// let client = RestClient::new();
/// let created = client
///     .post("https://api.test/items", r#"{"name":"widget"}"#)
///     .await?;
/// assert_eq!(created.status(), 201);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    engine: Engine,
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RestClient {
    /// Creates a client with the default configuration: HTTP/1.1, normal
    /// redirects, 30 second timeout, UTF-8 and the ambient Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built from the static default
    /// configuration, which indicates a broken TLS backend.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a client backed by [`ReqwestTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] if the transport cannot be built, for
    /// example because a root certificate is not valid PEM.
    #[instrument(level = "debug", skip(config), fields(version = ?config.version, redirect = ?config.redirect))]
    pub fn with_config(config: TransportConfig) -> Result<Self, RestError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client that dispatches through `transport`.
    ///
    /// Transport-level settings of `config` (version, redirects, TLS) are
    /// the transport's concern; the client uses its timeout, charset,
    /// executor and headers.
    #[must_use]
    pub fn with_transport(config: TransportConfig, transport: impl Transport) -> Self {
        Self {
            engine: Engine::new(&config, Arc::new(transport)),
        }
    }

    pub(crate) fn from_engine(engine: Engine) -> Self {
        Self { engine }
    }

    /// Sets a default header for every subsequent request.
    ///
    /// Requests already in flight keep the headers they were sent with.
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.engine.headers().insert(name, value);
    }

    /// Removes a default header. Removing an absent header is a no-op.
    pub fn remove_header(&self, name: &str) {
        self.engine.headers().remove(name);
    }

    /// The client's default-header set.
    #[must_use]
    pub fn default_headers(&self) -> &DefaultHeaders {
        self.engine.headers()
    }

    /// Sends `HEAD url`.
    pub fn head(&self, url: impl Into<String>) -> ResponseHandle<NoBodyResponse> {
        self.engine.head(RestRequest::head(url))
    }

    /// Sends `GET url` and returns the body as text.
    pub fn get(&self, url: impl Into<String>) -> ResponseHandle<StringResponse> {
        self.execute(RestRequest::get(url))
    }

    /// Sends `POST url` with a text body.
    pub fn post(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<StringResponse> {
        self.execute(RestRequest::post(url).body(body))
    }

    /// Sends `PUT url` with a text body.
    pub fn put(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<StringResponse> {
        self.execute(RestRequest::put(url).body(body))
    }

    /// Sends `PATCH url` with a text body.
    pub fn patch(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<StringResponse> {
        self.execute(RestRequest::patch(url).body(body))
    }

    /// Sends `DELETE url` and returns the body as text.
    pub fn delete(&self, url: impl Into<String>) -> ResponseHandle<StringResponse> {
        self.execute(RestRequest::delete(url))
    }

    /// Downloads `url` to `destination`.
    ///
    /// The body is streamed to a temporary file next to `destination` and
    /// renamed into place once complete; on failure or cancellation nothing
    /// is left at `destination`.
    pub fn download_file(
        &self,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> ResponseHandle<FileResponse> {
        self.engine.download(url.into(), destination.into())
    }

    /// Sends an arbitrary request and returns the body as text.
    pub fn execute(&self, request: RestRequest) -> ResponseHandle<StringResponse> {
        self.engine.text(request)
    }
}
