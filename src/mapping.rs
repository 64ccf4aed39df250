//! Object mapping between domain values and request/response bodies.
//!
//! The mapper is a capability with exactly two operations, so any backend can
//! be plugged in without touching the dispatch engine. [`JsonMapper`] is the
//! bundled `serde_json` implementation.
//!
//! Failures are reported in two distinct ways by the engine:
//! - outbound (serialize) failures become [`RestError::Serialization`]; the
//!   request is never sent and the caller can fix the value;
//! - inbound (deserialize) failures become [`RestError::Deserialization`];
//!   the remote payload did not match the requested type.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::error::{BoxError, RestError};
use crate::response::{MappedResponse, ResponseHeaders};

/// Which way a mapping failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingDirection {
    /// Domain value to body text.
    Serialize,
    /// Body text to domain value.
    Deserialize,
}

impl fmt::Display for MappingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => f.write_str("serialization"),
            Self::Deserialize => f.write_str("deserialization"),
        }
    }
}

/// A mapper failed to convert a value or body.
///
/// Inbound failures always carry the offending body text. Outbound failures
/// carry the Rust type name of the value; the value itself is only attached
/// when the mapper renders it through [`with_content`](Self::with_content),
/// since a `Serialize` bound alone gives no way to display it.
#[derive(Debug, Error)]
#[error("{direction} of {type_name} failed: {source}")]
pub struct MappingError {
    direction: MappingDirection,
    content: Option<String>,
    type_name: &'static str,
    #[source]
    source: BoxError,
}

impl MappingError {
    /// Creates an error for a value of type `type_name` that could not be serialized.
    pub fn outbound(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            direction: MappingDirection::Serialize,
            content: None,
            type_name,
            source: source.into(),
        }
    }

    /// Creates an error for body `content` that could not be read as `type_name`.
    pub fn inbound(
        content: impl Into<String>,
        type_name: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            direction: MappingDirection::Deserialize,
            content: Some(content.into()),
            type_name,
            source: source.into(),
        }
    }

    /// Attaches a textual rendering of the offending value or body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Direction of the failed conversion.
    #[must_use]
    pub fn direction(&self) -> MappingDirection {
        self.direction
    }

    /// The offending body text, or the rendered value when the mapper
    /// attached one to an outbound failure.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Rust type name of the value or target.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Pluggable object mapping capability.
pub trait ObjectMapper: Send + Sync + 'static {
    /// Converts `value` to body text.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] if the value cannot be represented.
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MappingError>;

    /// Converts body `text` to a value of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] carrying `text` if it does not describe a `T`.
    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, MappingError>;
}

/// `serde_json` backed mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapper;

impl ObjectMapper for JsonMapper {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MappingError> {
        serde_json::to_string(value)
            .map_err(|e| MappingError::outbound(std::any::type_name::<T>(), e))
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, MappingError> {
        serde_json::from_str(text)
            .map_err(|e| MappingError::inbound(text, std::any::type_name::<T>(), e))
    }
}

/// Serializes an outbound body, classifying failures as recoverable.
pub(crate) fn encode_body<M, B>(mapper: &M, url: &str, body: &B) -> Result<String, RestError>
where
    M: ObjectMapper,
    B: Serialize + ?Sized,
{
    let text = mapper
        .serialize(body)
        .map_err(|e| RestError::serialization(url, e))?;
    debug!(bytes = text.len(), "request body serialized");
    Ok(text)
}

/// Deserializes an inbound body into a [`MappedResponse`].
///
/// On failure no response is built; status and headers travel with the error.
pub(crate) fn decode_body<M, T>(
    mapper: &M,
    url: &str,
    status: u16,
    headers: ResponseHeaders,
    text: &str,
) -> Result<MappedResponse<T>, RestError>
where
    M: ObjectMapper,
    T: DeserializeOwned,
{
    match mapper.deserialize::<T>(text) {
        Ok(body) => Ok(MappedResponse::new(status, headers, body)),
        Err(error) => {
            debug!(status, target = error.type_name(), "response body did not map");
            Err(RestError::deserialization(url, status, headers, error))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize, Serializer};

    use super::*;
    use crate::error::FailureKind;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        name: String,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_json_mapper_round_trip() {
        let item = Item {
            id: 1,
            name: "widget".to_string(),
        };
        let text = JsonMapper.serialize(&item).unwrap();
        assert_eq!(text, r#"{"id":1,"name":"widget"}"#);
        let back: Item = JsonMapper.deserialize(&text).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_json_mapper_serialize_failure_is_outbound() {
        let error = JsonMapper.serialize(&Unserializable).unwrap_err();
        assert_eq!(error.direction(), MappingDirection::Serialize);
        assert!(error.content().is_none());
        assert!(error.type_name().ends_with("Unserializable"));
        assert!(error.to_string().contains("refusing to serialize"));
    }

    #[test]
    fn test_json_mapper_deserialize_failure_keeps_text() {
        let error = JsonMapper.deserialize::<Item>("[1,2]").unwrap_err();
        assert_eq!(error.direction(), MappingDirection::Deserialize);
        assert_eq!(error.content(), Some("[1,2]"));
        assert!(error.type_name().ends_with("Item"));
    }

    #[test]
    fn test_non_string_map_keys_fail_serialization() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "v");
        assert!(JsonMapper.serialize(&map).is_err());
    }

    #[test]
    fn test_encode_body_failure_is_recoverable() {
        let error = encode_body(&JsonMapper, "https://api.test/items", &Unserializable).unwrap_err();
        assert_eq!(error.kind(), FailureKind::Serialization);
        assert!(error.is_recoverable());
    }

    /// Mapper that renders the rejected value into the error.
    struct RenderingMapper;

    impl ObjectMapper for RenderingMapper {
        fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MappingError> {
            JsonMapper
                .serialize(value)
                .map_err(|e| e.with_content("Unserializable"))
        }

        fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, MappingError> {
            JsonMapper.deserialize(text)
        }
    }

    #[test]
    fn test_outbound_content_attached_by_mapper_reaches_caller() {
        let error =
            encode_body(&RenderingMapper, "https://api.test/items", &Unserializable).unwrap_err();
        match error {
            RestError::Serialization { source, .. } => {
                assert_eq!(source.direction(), MappingDirection::Serialize);
                assert_eq!(source.content(), Some("Unserializable"));
                assert!(source.type_name().ends_with("Unserializable"));
            }
            other => panic!("Expected Serialization error, got: {other:?}"),
        }
    }

    #[test]
    fn test_decode_body_success_and_failure() {
        let headers: ResponseHeaders = [("Content-Type", "application/json")].into_iter().collect();
        let ok: MappedResponse<Item> = decode_body(
            &JsonMapper,
            "https://api.test/items/1",
            200,
            headers.clone(),
            r#"{"id":1,"name":"widget"}"#,
        )
        .unwrap();
        assert_eq!(ok.body().name, "widget");

        let err = decode_body::<_, Item>(
            &JsonMapper,
            "https://api.test/items/1",
            200,
            headers,
            "not json",
        )
        .unwrap_err();
        match err {
            RestError::Deserialization {
                status,
                headers,
                source,
                ..
            } => {
                assert_eq!(status, 200);
                assert_eq!(headers.get("content-type"), Some("application/json"));
                assert_eq!(source.content(), Some("not json"));
            }
            other => panic!("Expected Deserialization error, got: {other:?}"),
        }
    }
}
