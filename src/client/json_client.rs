//! Typed client: request objects are serialized and response bodies
//! deserialized through an [`ObjectMapper`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{Engine, ResponseHandle, RestClient, RestRequest};
use crate::config::{DefaultHeaders, TransportConfig};
use crate::error::RestError;
use crate::mapping::{JsonMapper, ObjectMapper, encode_body};
use crate::response::{FileResponse, MappedResponse, NoBodyResponse};
use crate::transport::{ReqwestTransport, Transport};

/// REST client mapping bodies to and from Rust types.
///
/// The `*_json` operations serialize the body with the mapper before anything
/// is sent; if that fails the returned handle is already resolved with
/// [`RestError::Serialization`] and no request reaches the transport. Every
/// typed operation deserializes the response body exactly once; a body that
/// does not describe `T` resolves to [`RestError::Deserialization`].
///
/// # Example
///
/// ```no_run
/// use restclient_core::client::RestJsonClient;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct NewItem<'a> {
///     name: &'a str,
/// }
///
/// #[derive(Deserialize)]
/// struct Item {
///     id: u32,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restclient_core::error::RestError> {
/// let client = RestJsonClient::new();
/// let created = client
///     .post_json::<Item, _>("https://api.test/items", &NewItem { name: "widget" })
///     .await?;
/// println!("created #{} {}", created.body().id, created.body().name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RestJsonClient<M = JsonMapper> {
    engine: Engine,
    mapper: Arc<M>,
}

impl<M> Clone for RestJsonClient<M> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl Default for RestJsonClient<JsonMapper> {
    fn default() -> Self {
        Self::new()
    }
}

impl RestJsonClient<JsonMapper> {
    /// Creates a JSON client with the default configuration.
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

    /// Creates a JSON client backed by [`ReqwestTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] if the transport cannot be built.
    pub fn with_config(config: TransportConfig) -> Result<Self, RestError> {
        Self::with_config_and_mapper(config, JsonMapper)
    }
}

impl<M: ObjectMapper> RestJsonClient<M> {
    /// Creates a client with the default configuration and a custom mapper.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] if the transport cannot be built.
    pub fn with_mapper(mapper: M) -> Result<Self, RestError> {
        Self::with_config_and_mapper(TransportConfig::default(), mapper)
    }

    /// Creates a client from `config` and a custom mapper.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] if the transport cannot be built.
    #[instrument(level = "debug", skip(config, mapper), fields(version = ?config.version, redirect = ?config.redirect))]
    pub fn with_config_and_mapper(config: TransportConfig, mapper: M) -> Result<Self, RestError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport, mapper))
    }

    /// Creates a client that dispatches through `transport`.
    #[must_use]
    pub fn with_transport(config: TransportConfig, transport: impl Transport, mapper: M) -> Self {
        Self {
            engine: Engine::new(&config, Arc::new(transport)),
            mapper: Arc::new(mapper),
        }
    }

    /// The mapper used for request and response bodies.
    #[must_use]
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Sets a default header for every subsequent request.
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

    /// A text client sharing this client's transport and default headers.
    #[must_use]
    pub fn text(&self) -> RestClient {
        RestClient::from_engine(self.engine.clone())
    }

    /// Sends `HEAD url`.
    pub fn head(&self, url: impl Into<String>) -> ResponseHandle<NoBodyResponse> {
        self.engine.head(RestRequest::head(url))
    }

    /// Downloads `url` to `destination`; see [`RestClient::download_file`].
    pub fn download_file(
        &self,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> ResponseHandle<FileResponse> {
        self.engine.download(url.into(), destination.into())
    }

    /// Sends `GET url` and maps the body into `T`.
    pub fn get<T>(&self, url: impl Into<String>) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RestRequest::get(url))
    }

    /// Sends `POST url` with a text body and maps the response into `T`.
    pub fn post<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RestRequest::post(url).body(body))
    }

    /// Sends `POST url` with `body` serialized by the mapper.
    pub fn post_json<T, B>(
        &self,
        url: impl Into<String>,
        body: &B,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        self.execute_json(RestRequest::post(url), body)
    }

    /// Sends `PUT url` with a text body and maps the response into `T`.
    pub fn put<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RestRequest::put(url).body(body))
    }

    /// Sends `PUT url` with `body` serialized by the mapper.
    pub fn put_json<T, B>(
        &self,
        url: impl Into<String>,
        body: &B,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        self.execute_json(RestRequest::put(url), body)
    }

    /// Sends `PATCH url` with a text body and maps the response into `T`.
    pub fn patch<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RestRequest::patch(url).body(body))
    }

    /// Sends `PATCH url` with `body` serialized by the mapper.
    pub fn patch_json<T, B>(
        &self,
        url: impl Into<String>,
        body: &B,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        self.execute_json(RestRequest::patch(url), body)
    }

    /// Sends `DELETE url` and maps the body into `T`.
    pub fn delete<T>(&self, url: impl Into<String>) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RestRequest::delete(url))
    }

    /// Sends an arbitrary request and maps the response body into `T`.
    pub fn execute<T>(&self, request: RestRequest) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.engine.mapped(request, Arc::clone(&self.mapper))
    }

    /// Serializes `body` into `request` and sends it.
    ///
    /// A serialization failure resolves the handle immediately; the
    /// transport is never called.
    pub fn execute_json<T, B>(
        &self,
        request: RestRequest,
        body: &B,
    ) -> ResponseHandle<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        match encode_body(self.mapper.as_ref(), request.url(), body) {
            Ok(text) => self.execute(request.body(text)),
            Err(error) => Engine::failed(request.url().to_string(), error),
        }
    }
}
