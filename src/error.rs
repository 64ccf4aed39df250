//! Error types for the REST client engine.
//!
//! Every failure of a dispatch operation is reported through the same
//! [`ResponseHandle`](crate::client::ResponseHandle) that would have carried the
//! response, distinguished by variant. Nothing is retried at this layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::mapping::MappingError;
use crate::response::ResponseHeaders;
use crate::transport::TransportError;

/// Boxed error used where the concrete cause comes from a pluggable capability.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while dispatching a request.
#[derive(Debug, Error)]
pub enum RestError {
    /// The transport capability failed (connectivity, TLS, timeout, protocol).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The outbound body could not be serialized. The request was never sent.
    #[error("failed to serialize request body for {url}: {source}")]
    Serialization {
        /// The URL the request was meant for.
        url: String,
        /// The mapping failure.
        #[source]
        source: MappingError,
    },

    /// The inbound body could not be deserialized into the requested type.
    ///
    /// The network round trip succeeded; status and headers are kept for
    /// diagnostics but no typed response is produced.
    #[error("failed to deserialize response from {url} (HTTP {status}): {source}")]
    Deserialization {
        /// The URL that produced the response.
        url: String,
        /// Status code of the response whose body failed to map.
        status: u16,
        /// Headers of the response whose body failed to map.
        headers: ResponseHeaders,
        /// The mapping failure.
        #[source]
        source: MappingError,
    },

    /// The caller cancelled the operation before it completed.
    #[error("request to {url} was cancelled")]
    Cancelled {
        /// The URL of the cancelled request.
        url: String,
    },

    /// Local file system error while storing a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Downloaded size does not match the declared `Content-Length`.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        /// Destination that was not written.
        path: PathBuf,
        /// Declared size in bytes.
        expected_bytes: u64,
        /// Received size in bytes.
        actual_bytes: u64,
    },

    /// The client could not be constructed from the supplied configuration.
    #[error("invalid client configuration: {reason}")]
    Client {
        /// What was wrong.
        reason: String,
        /// The underlying builder error, when there is one.
        #[source]
        source: Option<BoxError>,
    },

    /// No executor was configured and no Tokio runtime is running.
    #[error("no async runtime available to dispatch request to {url}")]
    NoRuntime {
        /// The URL of the request that could not be dispatched.
        url: String,
    },
}

/// Coarse classification of a [`RestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network, DNS, TLS, timeout or protocol failure.
    Transport,
    /// The caller's body could not be serialized; fix the value and retry.
    Serialization,
    /// The remote body does not match the requested type.
    Deserialization,
    /// Cancelled by the caller.
    Cancellation,
    /// Local storage failure during a download.
    Storage,
    /// Client construction or runtime setup problem.
    Configuration,
}

impl RestError {
    /// Creates a serialization error for the request to `url`.
    pub fn serialization(url: impl Into<String>, source: MappingError) -> Self {
        Self::Serialization {
            url: url.into(),
            source,
        }
    }

    /// Creates a deserialization error, keeping the response status and headers.
    pub fn deserialization(
        url: impl Into<String>,
        status: u16,
        headers: ResponseHeaders,
        source: MappingError,
    ) -> Self {
        Self::Deserialization {
            url: url.into(),
            status,
            headers,
            source,
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates a configuration error.
    pub fn client(reason: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Client {
            reason: reason.into(),
            source,
        }
    }

    /// Creates a missing-runtime error.
    pub fn no_runtime(url: impl Into<String>) -> Self {
        Self::NoRuntime { url: url.into() }
    }

    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Serialization { .. } => FailureKind::Serialization,
            Self::Deserialization { .. } => FailureKind::Deserialization,
            Self::Cancelled { .. } => FailureKind::Cancellation,
            Self::Io { .. } | Self::Integrity { .. } => FailureKind::Storage,
            Self::Client { .. } | Self::NoRuntime { .. } => FailureKind::Configuration,
        }
    }

    /// Returns true when the caller can fix the cause locally and retry.
    ///
    /// Only outbound serialization failures qualify: the request was never
    /// sent and the fault lies in the value the caller supplied.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns the mapping failure for serialization/deserialization errors.
    #[must_use]
    pub fn mapping_error(&self) -> Option<&MappingError> {
        match self {
            Self::Serialization { source, .. } | Self::Deserialization { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
