//! Request dispatch.
//!
//! Two client flavours share one dispatch core:
//!
//! - [`RestClient`] sends and receives text.
//! - [`RestJsonClient`] serializes request objects and deserializes responses
//!   through a pluggable [`ObjectMapper`](crate::mapping::ObjectMapper).
//!
//! Every operation merges the client's default headers with the per-call
//! headers, spawns the request on the configured executor and returns a
//! [`ResponseHandle`] immediately.
//!
//! # Example
//!
//! ```no_run
//! use restclient_core::client::RestClient;
//!
//! # async fn example() -> Result<(), restclient_core::error::RestError> {
//! let client = RestClient::new();
//! client.add_header("Accept", "text/plain");
//! let response = client.get("https://api.test/status").await?;
//! println!("{}", response.body());
//! # Ok(())
//! # }
//! ```

mod download;
mod handle;
mod json_client;
mod request;
mod rest_client;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, warn};

pub use handle::ResponseHandle;
pub use json_client::RestJsonClient;
pub use request::RestRequest;
pub use rest_client::RestClient;

use crate::config::{Charset, DefaultHeaders, TransportConfig};
use crate::error::RestError;
use crate::mapping::{ObjectMapper, decode_body};
use crate::response::{FileResponse, MappedResponse, NoBodyResponse, StringResponse};
use crate::transport::{Method, Transport, TransportRequest};

/// Dispatch core shared by both client flavours.
///
/// Clones share the transport and the default-header set.
#[derive(Clone)]
pub(crate) struct Engine {
    transport: Arc<dyn Transport>,
    headers: DefaultHeaders,
    timeout: Duration,
    charset: Charset,
    executor: Option<Handle>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("default_headers", &self.headers.snapshot().len())
            .field("timeout", &self.timeout)
            .field("charset", &self.charset)
            .field("executor", &self.executor.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub(crate) fn new(config: &TransportConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            headers: config.default_headers(),
            timeout: config.timeout,
            charset: config.charset,
            executor: config.executor.clone(),
        }
    }

    pub(crate) fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    /// Builds the wire request: per-call headers over a snapshot of the
    /// defaults, body encoded with the client charset.
    fn prepare(&self, request: RestRequest) -> TransportRequest {
        let (method, url, per_call, body) = request.into_parts();
        let headers = self.headers.merged_with(&per_call);
        let body = body.map(|text| Bytes::from(self.charset.encode(&text)));
        debug!(
            method = %method,
            headers = headers.len(),
            body_bytes = body.as_ref().map_or(0, Bytes::len),
            "request prepared"
        );
        TransportRequest {
            method,
            url,
            headers,
            body,
            timeout: self.timeout,
        }
    }

    /// Runs `work` as a task on the executor and returns its handle.
    ///
    /// The task races `work` against the handle's cancellation token, so the
    /// in-flight future is dropped as soon as cancellation is requested.
    fn spawn<T, F, Fut>(&self, method: Method, url: String, work: F) -> ResponseHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, RestError>> + Send + 'static,
    {
        let Some(runtime) = self
            .executor
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            warn!(url = %url, "no async runtime available; request not sent");
            let error = RestError::no_runtime(url.as_str());
            return ResponseHandle::ready(url, Err(error));
        };

        let token = CancellationToken::new();
        let future = work(token.clone());
        let guard = token.clone();
        let cancelled_url = url.clone();
        let span = debug_span!("dispatch", method = %method, url = %url);

        let task = runtime.spawn(
            async move {
                tokio::select! {
                    biased;
                    () = guard.cancelled() => {
                        debug!("request cancelled");
                        Err(RestError::cancelled(cancelled_url))
                    }
                    result = future => result,
                }
            }
            .instrument(span),
        );

        ResponseHandle::spawned(url, task, token)
    }

    /// Dispatches a request whose response body is ignored.
    pub(crate) fn head(&self, request: RestRequest) -> ResponseHandle<NoBodyResponse> {
        let request = self.prepare(request);
        let (method, url) = (request.method, request.url.clone());
        let transport = Arc::clone(&self.transport);
        self.spawn(method, url, move |_token| async move {
            let response = transport.submit(request).await?;
            let (status, headers, _body) = response.into_parts();
            debug!(status, "response received");
            Ok(NoBodyResponse::new(status, headers))
        })
    }

    /// Dispatches a request and decodes the response body as text.
    pub(crate) fn text(&self, request: RestRequest) -> ResponseHandle<StringResponse> {
        let request = self.prepare(request);
        let (method, url) = (request.method, request.url.clone());
        let transport = Arc::clone(&self.transport);
        let charset = self.charset;
        self.spawn(method, url, move |_token| async move {
            let (status, headers, bytes) = transport.submit(request).await?.collect_body().await?;
            debug!(status, body_bytes = bytes.len(), "response received");
            Ok(StringResponse::new(status, headers, charset.decode(&bytes)))
        })
    }

    /// Dispatches a request and maps the response body into `T`.
    pub(crate) fn mapped<M, T>(
        &self,
        request: RestRequest,
        mapper: Arc<M>,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        M: ObjectMapper,
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let request = self.prepare(request);
        let (method, url) = (request.method, request.url.clone());
        let transport = Arc::clone(&self.transport);
        let charset = self.charset;
        self.spawn(method, url, move |token| async move {
            let url = request.url.clone();
            let (status, headers, bytes) = transport.submit(request).await?.collect_body().await?;
            debug!(status, body_bytes = bytes.len(), "response received");
            if token.is_cancelled() {
                return Err(RestError::cancelled(url));
            }
            let text = charset.decode(&bytes);
            decode_body(mapper.as_ref(), &url, status, headers, &text)
        })
    }

    /// Dispatches a `GET` and streams the body to `destination`.
    pub(crate) fn download(
        &self,
        url: String,
        destination: PathBuf,
    ) -> ResponseHandle<FileResponse> {
        let request = self.prepare(RestRequest::get(url));
        let (method, url) = (request.method, request.url.clone());
        let transport = Arc::clone(&self.transport);
        self.spawn(method, url, move |token| async move {
            download::download_to_path(transport.as_ref(), request, destination, token).await
        })
    }

    /// Returns a handle already resolved with `error`; nothing is sent.
    pub(crate) fn failed<T>(url: String, error: RestError) -> ResponseHandle<T> {
        debug!(url = %url, error = %error, "request rejected before dispatch");
        ResponseHandle::ready(url, Err(error))
    }
}
