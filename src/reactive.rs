//! Single-emission stream adapters over the clients.
//!
//! [`single`] is the one conversion from a [`ResponseHandle`] to a stream;
//! the reactive clients route every operation through it. A [`Single`]
//! yields exactly one item (the response or the error the handle resolved
//! to) and then ends. Dropping it before it yields cancels the request.
//!
//! # Example
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use restclient_core::reactive::ReactiveRestClient;
//!
//! # async fn example() {
//! let client = ReactiveRestClient::new();
//! let mut stream = client.get("https://api.test/status");
//! if let Some(Ok(response)) = stream.next().await {
//!     println!("{}", response.body());
//! }
//! # }
//! ```

use std::path::PathBuf;

use futures_util::stream::{self, Once};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{ResponseHandle, RestClient, RestJsonClient, RestRequest};
use crate::mapping::{JsonMapper, ObjectMapper};
use crate::response::{FileResponse, MappedResponse, NoBodyResponse, StringResponse};

/// A stream that emits the outcome of one request, then completes.
pub type Single<T> = Once<ResponseHandle<T>>;

/// Converts a response handle into a single-emission stream.
///
/// The stream's only item is exactly what awaiting the handle would return.
pub fn single<T>(handle: ResponseHandle<T>) -> Single<T> {
    stream::once(handle)
}

/// [`RestClient`] exposed through single-emission streams.
#[derive(Debug, Clone, Default)]
pub struct ReactiveRestClient {
    inner: RestClient,
}

impl From<RestClient> for ReactiveRestClient {
    fn from(inner: RestClient) -> Self {
        Self { inner }
    }
}

impl ReactiveRestClient {
    /// Wraps a text client with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from(RestClient::new())
    }

    /// The wrapped client.
    #[must_use]
    pub fn inner(&self) -> &RestClient {
        &self.inner
    }

    /// See [`RestClient::add_header`].
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.add_header(name, value);
    }

    /// See [`RestClient::remove_header`].
    pub fn remove_header(&self, name: &str) {
        self.inner.remove_header(name);
    }

    /// See [`RestClient::head`].
    pub fn head(&self, url: impl Into<String>) -> Single<NoBodyResponse> {
        single(self.inner.head(url))
    }

    /// See [`RestClient::get`].
    pub fn get(&self, url: impl Into<String>) -> Single<StringResponse> {
        single(self.inner.get(url))
    }

    /// See [`RestClient::post`].
    pub fn post(&self, url: impl Into<String>, body: impl Into<String>) -> Single<StringResponse> {
        single(self.inner.post(url, body))
    }

    /// See [`RestClient::put`].
    pub fn put(&self, url: impl Into<String>, body: impl Into<String>) -> Single<StringResponse> {
        single(self.inner.put(url, body))
    }

    /// See [`RestClient::patch`].
    pub fn patch(&self, url: impl Into<String>, body: impl Into<String>) -> Single<StringResponse> {
        single(self.inner.patch(url, body))
    }

    /// See [`RestClient::delete`].
    pub fn delete(&self, url: impl Into<String>) -> Single<StringResponse> {
        single(self.inner.delete(url))
    }

    /// See [`RestClient::download_file`].
    pub fn download_file(
        &self,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Single<FileResponse> {
        single(self.inner.download_file(url, destination))
    }

    /// See [`RestClient::execute`].
    pub fn execute(&self, request: RestRequest) -> Single<StringResponse> {
        single(self.inner.execute(request))
    }
}

/// [`RestJsonClient`] exposed through single-emission streams.
#[derive(Debug, Clone)]
pub struct ReactiveJsonClient<M = JsonMapper> {
    inner: RestJsonClient<M>,
}

impl<M> From<RestJsonClient<M>> for ReactiveJsonClient<M> {
    fn from(inner: RestJsonClient<M>) -> Self {
        Self { inner }
    }
}

impl Default for ReactiveJsonClient<JsonMapper> {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveJsonClient<JsonMapper> {
    /// Wraps a JSON client with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from(RestJsonClient::new())
    }
}

impl<M: ObjectMapper> ReactiveJsonClient<M> {
    /// The wrapped client.
    #[must_use]
    pub fn inner(&self) -> &RestJsonClient<M> {
        &self.inner
    }

    /// See [`RestJsonClient::add_header`].
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.add_header(name, value);
    }

    /// See [`RestJsonClient::remove_header`].
    pub fn remove_header(&self, name: &str) {
        self.inner.remove_header(name);
    }

    /// See [`RestJsonClient::head`].
    pub fn head(&self, url: impl Into<String>) -> Single<NoBodyResponse> {
        single(self.inner.head(url))
    }

    /// See [`RestJsonClient::download_file`].
    pub fn download_file(
        &self,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Single<FileResponse> {
        single(self.inner.download_file(url, destination))
    }

    /// See [`RestJsonClient::get`].
    pub fn get<T>(&self, url: impl Into<String>) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.get(url))
    }

    /// See [`RestJsonClient::post`].
    pub fn post<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.post(url, body))
    }

    /// See [`RestJsonClient::post_json`].
    pub fn post_json<T, B>(&self, url: impl Into<String>, body: &B) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        single(self.inner.post_json(url, body))
    }

    /// See [`RestJsonClient::put`].
    pub fn put<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.put(url, body))
    }

    /// See [`RestJsonClient::put_json`].
    pub fn put_json<T, B>(&self, url: impl Into<String>, body: &B) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        single(self.inner.put_json(url, body))
    }

    /// See [`RestJsonClient::patch`].
    pub fn patch<T>(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.patch(url, body))
    }

    /// See [`RestJsonClient::patch_json`].
    pub fn patch_json<T, B>(&self, url: impl Into<String>, body: &B) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        single(self.inner.patch_json(url, body))
    }

    /// See [`RestJsonClient::delete`].
    pub fn delete<T>(&self, url: impl Into<String>) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.delete(url))
    }

    /// See [`RestJsonClient::execute`].
    pub fn execute<T>(&self, request: RestRequest) -> Single<MappedResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        single(self.inner.execute(request))
    }
}
