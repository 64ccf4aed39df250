//! Transport configuration for REST clients.
//!
//! A [`TransportConfig`] is built once per client and is immutable afterwards.
//! The only mutable piece of client state is the default-header set
//! ([`DefaultHeaders`]), which lives on the client itself.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use restclient_core::config::{HttpVersion, RedirectPolicy, TransportConfig};
//!
//! let config = TransportConfig::builder()
//!     .version(HttpVersion::Http2)
//!     .redirect(RedirectPolicy::Always)
//!     .timeout(Duration::from_secs(10))
//!     .header("Accept", "application/json")
//!     .build();
//! assert_eq!(config.timeout, Duration::from_secs(10));
//! ```

mod constants;
mod headers;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::runtime::Handle;

pub use constants::{
    CONTENT_TYPE, DEFAULT_CONTENT_TYPE, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_SECS, MAX_REDIRECTS,
};
pub use headers::{DefaultHeaders, HeaderList, merge_headers};

/// HTTP protocol version requested from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    #[default]
    Http11,
    /// Prefer HTTP/2, falling back to HTTP/1.1 when the server does not offer it.
    Http2,
}

impl FromStr for HttpVersion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1.1" | "http/1.1" | "http11" => Ok(Self::Http11),
            "2" | "h2" | "http/2" | "http2" => Ok(Self::Http2),
            other => Err(format!("unknown HTTP version '{other}' (expected 1.1 or 2)")),
        }
    }
}

/// Redirect handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPolicy {
    /// Never follow redirects; the 3xx response is returned as is.
    Never,
    /// Always follow redirects.
    Always,
    /// Follow redirects except HTTPS to HTTP downgrades.
    #[default]
    Normal,
}

impl FromStr for RedirectPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            "normal" => Ok(Self::Normal),
            other => Err(format!(
                "unknown redirect policy '{other}' (expected never, always or normal)"
            )),
        }
    }
}

/// Character set used to encode request bodies and decode response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1 (Latin-1).
    Iso8859_1,
    /// 7-bit US-ASCII.
    UsAscii,
}

impl Charset {
    /// Returns the canonical charset label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::UsAscii => "US-ASCII",
        }
    }

    /// Encodes `text`, replacing unrepresentable characters with `?`.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Self::UsAscii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }

    /// Decodes `bytes`, replacing malformed input with U+FFFD.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::UsAscii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Self::Iso8859_1),
            "us-ascii" | "ascii" => Ok(Self::UsAscii),
            other => Err(format!("unsupported charset '{other}'")),
        }
    }
}

/// TLS settings for the bundled transport.
#[derive(Clone, Default)]
pub struct TlsConfig {
    root_certificates_pem: Vec<Vec<u8>>,
    accept_invalid_certs: bool,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("root_certificates", &self.root_certificates_pem.len())
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl TlsConfig {
    /// Creates TLS settings that trust the platform roots only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts an additional PEM-encoded root certificate.
    #[must_use]
    pub fn add_root_certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates_pem.push(pem.into());
        self
    }

    /// Disables certificate validation. Only for test servers.
    #[must_use]
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Extra trusted roots, PEM-encoded.
    #[must_use]
    pub fn root_certificates_pem(&self) -> &[Vec<u8>] {
        &self.root_certificates_pem
    }

    /// Whether certificate validation is disabled.
    #[must_use]
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}

/// Immutable configuration of a client and its transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Protocol version.
    pub version: HttpVersion,
    /// Redirect policy.
    pub redirect: RedirectPolicy,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TLS overrides; `None` uses the platform defaults.
    pub tls: Option<TlsConfig>,
    /// Body charset.
    pub charset: Charset,
    /// Executor for dispatch tasks; `None` uses the ambient Tokio runtime.
    pub executor: Option<Handle>,
    /// Initial default headers, layered over `Content-Type: application/json`.
    pub headers: HeaderList,
    /// User-Agent sent by the bundled transport; `None` uses the crate default.
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            version: HttpVersion::default(),
            redirect: RedirectPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            tls: None,
            charset: Charset::default(),
            executor: None,
            headers: Vec::new(),
            user_agent: None,
        }
    }
}

impl TransportConfig {
    /// Starts a builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Creates the client's default-header set from this configuration.
    #[must_use]
    pub fn default_headers(&self) -> DefaultHeaders {
        DefaultHeaders::with_headers(self.headers.iter().cloned())
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Sets the protocol version.
    #[must_use]
    pub fn version(mut self, version: HttpVersion) -> Self {
        self.config.version = version;
        self
    }

    /// Sets the redirect policy.
    #[must_use]
    pub fn redirect(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirect = policy;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets TLS overrides.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    /// Sets the body charset.
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.config.charset = charset;
        self
    }

    /// Runs dispatch tasks on `executor` instead of the ambient runtime.
    #[must_use]
    pub fn executor(mut self, executor: Handle) -> Self {
        self.config.executor = Some(executor);
        self
    }

    /// Adds an initial default header. Later values for the same name win.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    /// Adds several initial default headers.
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Overrides the User-Agent of the bundled transport.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        self.config
    }
}
