//! Response model returned by dispatch operations.
//!
//! Four shapes, one per class of operation:
//! - [`NoBodyResponse`] for `HEAD`
//! - [`StringResponse`] for untyped calls (raw text body)
//! - [`MappedResponse`] for typed calls (body deserialized by the mapper)
//! - [`FileResponse`] for downloads (body stored on disk)
//!
//! All of them expose status and headers through [`ResponseMeta`] without
//! touching the body. Each value is built once per completed call and owned
//! by the caller from then on.

use std::path::{Path, PathBuf};

/// Ordered response headers, one entry per name with all of its values.
///
/// Lookups are case-insensitive; names keep the spelling of their first
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl ResponseHeaders {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, grouping it with earlier values of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns every value of a header, in arrival order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Iterates over `(name, values)` entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the declared `Content-Length`, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.get("content-length")
            .and_then(|value| value.trim().parse::<u64>().ok())
    }
}

impl<K, V> FromIterator<(K, V)> for ResponseHeaders
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// Status and headers shared by every response shape.
pub trait ResponseMeta {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Response headers.
    fn headers(&self) -> &ResponseHeaders;

    /// Returns true for 2xx status codes.
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }
}

/// Response to a `HEAD` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoBodyResponse {
    status: u16,
    headers: ResponseHeaders,
}

impl NoBodyResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders) -> Self {
        Self { status, headers }
    }
}

impl ResponseMeta for NoBodyResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }
}

/// Response with the raw body decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringResponse {
    status: u16,
    headers: ResponseHeaders,
    body: String,
}

impl StringResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body text.
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }
}

impl ResponseMeta for StringResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }
}

/// Response whose body was deserialized into `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedResponse<T> {
    status: u16,
    headers: ResponseHeaders,
    body: T,
}

impl<T> MappedResponse<T> {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, body: T) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The mapped body.
    #[must_use]
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Consumes the response, returning the mapped body.
    #[must_use]
    pub fn into_body(self) -> T {
        self.body
    }

    /// Consumes the response, returning status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (u16, ResponseHeaders, T) {
        (self.status, self.headers, self.body)
    }
}

impl<T> ResponseMeta for MappedResponse<T> {
    fn status(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }
}

/// Response whose body was written to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResponse {
    status: u16,
    headers: ResponseHeaders,
    path: PathBuf,
    bytes_written: u64,
}

impl FileResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, path: PathBuf, bytes_written: u64) -> Self {
        Self {
            status,
            headers,
            path,
            bytes_written,
        }
    }

    /// Path of the stored body.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of body bytes stored.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the response, returning the stored path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl ResponseMeta for FileResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_group_repeated_names_case_insensitively() {
        let headers: ResponseHeaders = [
            ("Set-Cookie", "a=1"),
            ("Content-Type", "application/json"),
            ("set-cookie", "b=2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("SET-COOKIE"), ["a=1", "b=2"]);
        assert_eq!(headers.get("content-type"), Some("application/json"));
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Set-Cookie", "Content-Type"]);
    }

    #[test]
    fn test_missing_header_lookups() {
        let headers = ResponseHeaders::new();
        assert!(headers.is_empty());
        assert!(headers.get("x-missing").is_none());
        assert!(headers.get_all("x-missing").is_empty());
        assert!(!headers.contains("x-missing"));
    }

    #[test]
    fn test_content_length_parsing() {
        let headers: ResponseHeaders = [("Content-Length", " 42 ")].into_iter().collect();
        assert_eq!(headers.content_length(), Some(42));

        let headers: ResponseHeaders = [("Content-Length", "many")].into_iter().collect();
        assert_eq!(headers.content_length(), None);
    }

    #[test]
    fn test_meta_is_available_without_body() {
        let response = FileResponse::new(
            206,
            [("Content-Length", "3")].into_iter().collect(),
            PathBuf::from("/tmp/file.bin"),
            3,
        );
        assert_eq!(response.status(), 206);
        assert!(response.is_success());
        assert_eq!(response.headers().content_length(), Some(3));
        assert_eq!(response.path(), Path::new("/tmp/file.bin"));
    }

    #[test]
    fn test_mapped_response_into_parts() {
        let response = MappedResponse::new(201, ResponseHeaders::new(), vec![1, 2, 3]);
        assert!(response.is_success());
        let (status, headers, body) = response.into_parts();
        assert_eq!(status, 201);
        assert!(headers.is_empty());
        assert_eq!(body, vec![1, 2, 3]);
    }

    #[test]
    fn test_non_2xx_is_not_success() {
        let response = StringResponse::new(404, ResponseHeaders::new(), "missing".to_string());
        assert!(!response.is_success());
        assert_eq!(response.body(), "missing");
        assert_eq!(NoBodyResponse::new(301, ResponseHeaders::new()).status(), 301);
    }
}
