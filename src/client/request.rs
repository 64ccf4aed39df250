//! Per-call request description.

use crate::config::HeaderList;
use crate::transport::Method;

/// A request as described by the caller: method, URL, per-call headers and
/// an optional text body.
///
/// Per-call headers are overlaid on the client's default headers at dispatch
/// time; on a name collision the per-call value wins.
///
/// # Example
///
/// ```
/// use restclient_core::client::RestRequest;
///
/// let request = RestRequest::post("https://api.test/items")
///     .header("Content-Type", "text/plain")
///     .body("hello");
/// assert_eq!(request.body_text(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRequest {
    method: Method,
    url: String,
    headers: HeaderList,
    body: Option<String>,
}

impl RestRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a `HEAD` request.
    #[must_use]
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::Head, url)
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Creates a `POST` request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Creates a `PUT` request.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// Creates a `PATCH` request.
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// Creates a `DELETE` request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Adds a per-call header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds several per-call headers.
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the text body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Per-call headers, in insertion order.
    #[must_use]
    pub fn per_call_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Text body, if any.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Method, String, HeaderList, Option<String>) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_method() {
        assert_eq!(RestRequest::head("u").method(), Method::Head);
        assert_eq!(RestRequest::get("u").method(), Method::Get);
        assert_eq!(RestRequest::post("u").method(), Method::Post);
        assert_eq!(RestRequest::put("u").method(), Method::Put);
        assert_eq!(RestRequest::patch("u").method(), Method::Patch);
        assert_eq!(RestRequest::delete("u").method(), Method::Delete);
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let request = RestRequest::get("https://api.test")
            .header("X-A", "1")
            .headers([("X-B", "2"), ("X-C", "3")]);
        let names: Vec<&str> = request
            .per_call_headers()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, ["X-A", "X-B", "X-C"]);
        assert!(request.body_text().is_none());
    }
}
