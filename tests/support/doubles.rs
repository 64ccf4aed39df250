//! Transport and mapper test doubles.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use restclient_core::mapping::{JsonMapper, MappingError, ObjectMapper};
use restclient_core::response::ResponseHeaders;
use restclient_core::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One scripted reply of a [`CapturingTransport`].
pub enum Reply {
    /// Respond with a status, headers and an in-memory body.
    Body {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Respond with the request body as the response body.
    Echo { status: u16 },
    /// Fail before any response is obtained.
    Fail(fn(&str) -> TransportError),
}

impl Reply {
    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Body {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(status: u16, headers: &[(&str, &str)], body: impl Into<Vec<u8>>) -> Self {
        Self::Body {
            status,
            headers: headers
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
            body: body.into(),
        }
    }
}

/// Records every submitted request and answers from a script.
///
/// When the script is exhausted it answers `200` with an empty body.
#[derive(Default)]
pub struct CapturingTransport {
    requests: Mutex<Vec<TransportRequest>>,
    script: Mutex<VecDeque<Reply>>,
}

impl CapturingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        let transport = Self::default();
        transport
            .script
            .lock()
            .expect("script lock")
            .extend(replies);
        Arc::new(transport)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests()
            .pop()
            .expect("transport was not called")
    }
}

#[async_trait]
impl Transport for CapturingTransport {
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let reply = self.script.lock().expect("script lock").pop_front();
        let echoed = request.body.clone().unwrap_or_default();
        let url = request.url.clone();
        self.requests.lock().expect("requests lock").push(request);

        match reply {
            None => Ok(TransportResponse::from_bytes(200, ResponseHeaders::new(), Bytes::new())),
            Some(Reply::Body {
                status,
                headers,
                body,
            }) => Ok(TransportResponse::from_bytes(
                status,
                headers.into_iter().collect(),
                body,
            )),
            Some(Reply::Echo { status }) => Ok(TransportResponse::from_bytes(
                status,
                ResponseHeaders::new(),
                echoed,
            )),
            Some(Reply::Fail(make_error)) => Err(make_error(&url)),
        }
    }
}

/// Streams `chunks`, then either ends or fails, optionally hanging forever
/// after the chunks.
pub struct StreamingTransport {
    pub chunks: Vec<&'static [u8]>,
    pub content_length: Option<u64>,
    pub fail_after_chunks: bool,
    pub hang_after_chunks: bool,
}

impl StreamingTransport {
    pub fn complete(chunks: Vec<&'static [u8]>) -> Self {
        let total = chunks.iter().map(|c| c.len() as u64).sum();
        Self {
            chunks,
            content_length: Some(total),
            fail_after_chunks: false,
            hang_after_chunks: false,
        }
    }

    pub fn failing(chunks: Vec<&'static [u8]>, declared_length: u64) -> Self {
        Self {
            chunks,
            content_length: Some(declared_length),
            fail_after_chunks: true,
            hang_after_chunks: false,
        }
    }

    pub fn hanging(chunks: Vec<&'static [u8]>) -> Self {
        Self {
            chunks,
            content_length: None,
            fail_after_chunks: false,
            hang_after_chunks: true,
        }
    }
}

#[async_trait]
impl Transport for StreamingTransport {
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut items: Vec<Result<Bytes, TransportError>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk)))
            .collect();
        if self.fail_after_chunks {
            items.push(Err(TransportError::body(
                request.url.as_str(),
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )));
        }

        let headers: ResponseHeaders = self
            .content_length
            .map(|len| ("Content-Length", len.to_string()))
            .into_iter()
            .collect();

        let body = stream::iter(items);
        let body = if self.hang_after_chunks {
            body.chain(stream::pending()).boxed()
        } else {
            body.boxed()
        };
        Ok(TransportResponse::new(200, headers, body))
    }
}

/// Waits `delay` before answering; records whether it ever finished.
pub struct SlowTransport {
    pub delay: Duration,
    pub completed: AtomicBool,
    pub started: AtomicUsize,
}

impl SlowTransport {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            completed: AtomicBool::new(false),
            started: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Transport for SlowTransport {
    async fn submit(
        &self,
        _request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(TransportResponse::from_bytes(
            200,
            ResponseHeaders::new(),
            r#"{"id":1,"name":"late"}"#,
        ))
    }
}

/// Call counters shared between a [`CountingMapper`] and the test.
#[derive(Debug, Default)]
pub struct MapperCalls {
    pub serialize: AtomicUsize,
    pub deserialize: AtomicUsize,
}

impl MapperCalls {
    pub fn serialized(&self) -> usize {
        self.serialize.load(Ordering::SeqCst)
    }

    pub fn deserialized(&self) -> usize {
        self.deserialize.load(Ordering::SeqCst)
    }
}

/// [`JsonMapper`] that counts its calls.
#[derive(Debug, Clone, Default)]
pub struct CountingMapper {
    pub calls: Arc<MapperCalls>,
}

impl ObjectMapper for CountingMapper {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, MappingError> {
        self.calls.serialize.fetch_add(1, Ordering::SeqCst);
        JsonMapper.serialize(value)
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, MappingError> {
        self.calls.deserialize.fetch_add(1, Ordering::SeqCst);
        JsonMapper.deserialize(text)
    }
}
