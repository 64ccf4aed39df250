//! Restclient Core Library
//!
//! An asynchronous REST client engine. Every operation returns immediately
//! with a [`ResponseHandle`] that resolves to one of four response shapes,
//! or to a [`RestError`] distinguished by kind.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Transport configuration and the shared default-header set
//! - [`transport`] - The transport capability and its `reqwest` implementation
//! - [`mapping`] - Pluggable object mapper and the body mapping steps
//! - [`client`] - Request dispatch: text and JSON clients, streaming downloads
//! - [`response`] - Response model
//! - [`reactive`] - Single-emission stream adapters over the clients
//! - [`error`] - Failure taxonomy

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod mapping;
pub mod reactive;
pub mod response;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use client::{ResponseHandle, RestClient, RestJsonClient, RestRequest};
pub use config::{Charset, HttpVersion, RedirectPolicy, TlsConfig, TransportConfig};
pub use error::{FailureKind, RestError};
pub use mapping::{JsonMapper, MappingError, ObjectMapper};
pub use reactive::{ReactiveJsonClient, ReactiveRestClient, Single, single};
pub use response::{
    FileResponse, MappedResponse, NoBodyResponse, ResponseHeaders, ResponseMeta, StringResponse,
};
pub use transport::{Method, ReqwestTransport, Transport, TransportError};
