//! `reqwest` backed transport.
//!
//! Translates a [`TransportConfig`] into a `reqwest::Client` once, then
//! serves every request of a client through it, sharing its connection pool.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Client, ClientBuilder, redirect};
use tracing::{debug, instrument};
use url::Url;

use super::{Method, Transport, TransportError, TransportRequest, TransportResponse};
use crate::config::{HttpVersion, MAX_REDIRECTS, RedirectPolicy, TransportConfig};
use crate::error::RestError;
use crate::response::ResponseHeaders;
use crate::user_agent;

/// Transport backed by a shared `reqwest::Client`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] if a configured root certificate is not
    /// valid PEM or the underlying client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, RestError> {
        let client = client_builder(config)?
            .build()
            .map_err(|e| RestError::client("failed to build HTTP client", Some(Box::new(e))))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, keeping whatever settings it was built with.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let parsed =
            Url::parse(&url).map_err(|e| TransportError::invalid_request(&url, e.to_string()))?;
        let header_map = to_header_map(&url, &headers)?;

        let mut builder = self
            .client
            .request(to_reqwest_method(method), parsed)
            .headers(header_map)
            .timeout(timeout);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| classify_error(&url, e))?;

        let status = response.status().as_u16();
        let response_headers = from_header_map(response.headers());
        debug!(status, headers = response_headers.len(), "response head received");

        let stream_url = url;
        let body = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(stream_url.as_str())
                } else {
                    TransportError::body(stream_url.as_str(), e)
                }
            })
        });

        Ok(TransportResponse::new(
            status,
            response_headers,
            Box::pin(body),
        ))
    }
}

fn client_builder(config: &TransportConfig) -> Result<ClientBuilder, RestError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(user_agent::default_user_agent);

    let mut builder = Client::builder()
        .timeout(config.timeout)
        .gzip(true)
        .redirect(redirect_policy(config.redirect))
        .user_agent(user_agent);

    builder = match config.version {
        HttpVersion::Http11 => builder.http1_only(),
        // HTTP/2 is negotiated through ALPN and falls back to HTTP/1.1.
        HttpVersion::Http2 => builder,
    };

    if let Some(tls) = &config.tls {
        for pem in tls.root_certificates_pem() {
            for certificate in parse_root_certificates(pem)? {
                builder = builder.add_root_certificate(certificate);
            }
        }
        if tls.accepts_invalid_certs() {
            builder = builder.danger_accept_invalid_certs(true);
        }
    }

    Ok(builder)
}

/// Parses every certificate in a PEM bundle.
///
/// Input holding no certificate at all is rejected rather than trusted as an
/// empty set.
fn parse_root_certificates(pem: &[u8]) -> Result<Vec<Certificate>, RestError> {
    let certificates = Certificate::from_pem_bundle(pem)
        .map_err(|e| RestError::client("invalid PEM root certificate", Some(Box::new(e))))?;
    if certificates.is_empty() {
        return Err(RestError::client("invalid PEM root certificate", None));
    }
    Ok(certificates)
}

fn redirect_policy(policy: RedirectPolicy) -> redirect::Policy {
    match policy {
        RedirectPolicy::Never => redirect::Policy::none(),
        RedirectPolicy::Always => redirect::Policy::limited(MAX_REDIRECTS),
        RedirectPolicy::Normal => redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            if permits_redirect(attempt.previous().last(), attempt.url()) {
                attempt.follow()
            } else {
                attempt.stop()
            }
        }),
    }
}

/// Redirect rule of [`RedirectPolicy::Normal`]: follow anything except an
/// HTTPS to HTTP downgrade.
fn permits_redirect(previous: Option<&Url>, next: &Url) -> bool {
    let from_https = previous.is_some_and(|url| url.scheme() == "https");
    !(from_https && next.scheme() == "http")
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Head => reqwest::Method::HEAD,
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn to_header_map(url: &str, headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            TransportError::invalid_request(url, format!("invalid header name '{name}'"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            TransportError::invalid_request(url, format!("invalid value for header '{name}'"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn from_header_map(map: &HeaderMap) -> ResponseHeaders {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(url)
    } else if error.is_builder() {
        TransportError::invalid_request(url, error.to_string())
    } else {
        TransportError::network(url, error)
    }
}
