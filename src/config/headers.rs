//! Default headers shared by every request of a client.
//!
//! The set is copy-on-write: dispatch takes a cheap `Arc` snapshot under a
//! read lock, mutations build a new list and swap it in under the write lock.
//! A snapshot is never observed half-written, but no ordering is promised
//! between a mutation and requests that were already dispatched.

use std::sync::{Arc, PoisonError, RwLock};

use super::constants::{CONTENT_TYPE, DEFAULT_CONTENT_TYPE};

/// Ordered list of header name/value pairs.
pub type HeaderList = Vec<(String, String)>;

/// Concurrency-safe, ordered default-header map.
///
/// Names compare case-insensitively. Cloning shares the underlying set, so
/// every clone observes the same mutations.
#[derive(Debug, Clone)]
pub struct DefaultHeaders {
    current: Arc<RwLock<Arc<HeaderList>>>,
}

impl Default for DefaultHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultHeaders {
    /// Creates a set holding only `Content-Type: application/json`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_headers(std::iter::empty::<(String, String)>())
    }

    /// Creates a set from `headers`, layered over the default `Content-Type`.
    ///
    /// A `Content-Type` among `headers` overrides the default.
    #[must_use]
    pub fn with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut list = vec![(CONTENT_TYPE.to_string(), DEFAULT_CONTENT_TYPE.to_string())];
        for (name, value) in headers {
            upsert(&mut list, name.into(), value.into());
        }
        Self {
            current: Arc::new(RwLock::new(Arc::new(list))),
        }
    }

    /// Inserts a header, overwriting any existing value for the same name.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = HeaderList::clone(&guard);
        upsert(&mut next, name, value);
        *guard = Arc::new(next);
    }

    /// Removes a header. Does nothing if the header is not present.
    pub fn remove(&self, name: &str) -> Option<String> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let position = guard.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        let mut next = HeaderList::clone(&guard);
        let (_, value) = next.remove(position);
        *guard = Arc::new(next);
        Some(value)
    }

    /// Returns the current value of a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.snapshot()
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Returns the current header list.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HeaderList> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the current defaults overlaid with `overrides` (overrides win).
    #[must_use]
    pub fn merged_with(&self, overrides: &[(String, String)]) -> HeaderList {
        merge_headers(&self.snapshot(), overrides)
    }
}

/// Overlays `overrides` on `defaults`.
///
/// Default order is preserved; an override replaces the value of a default
/// with the same (case-insensitive) name in place, other overrides are
/// appended in their given order.
#[must_use]
pub fn merge_headers(defaults: &[(String, String)], overrides: &[(String, String)]) -> HeaderList {
    let mut merged = defaults.to_vec();
    for (name, value) in overrides {
        upsert(&mut merged, name.clone(), value.clone());
    }
    merged
}

fn upsert(list: &mut HeaderList, name: String, value: String) {
    match list.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
        Some(entry) => entry.1 = value,
        None => list.push((name, value)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_new_contains_json_content_type() {
        let headers = DefaultHeaders::new();
        assert_eq!(
            headers.get("content-type").as_deref(),
            Some(DEFAULT_CONTENT_TYPE)
        );
        assert_eq!(headers.snapshot().len(), 1);
    }

    #[test]
    fn test_with_headers_can_override_content_type() {
        let headers =
            DefaultHeaders::with_headers([("content-type", "text/plain"), ("X-Trace", "1")]);
        let snapshot = headers.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], pair("Content-Type", "text/plain"));
        assert_eq!(snapshot[1], pair("X-Trace", "1"));
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let headers = DefaultHeaders::new();
        headers.insert("Accept", "text/html");
        headers.insert("X-Api-Key", "secret");
        headers.insert("ACCEPT", "application/json");

        let snapshot = headers.snapshot();
        assert_eq!(
            *snapshot,
            vec![
                pair("Content-Type", DEFAULT_CONTENT_TYPE),
                pair("Accept", "application/json"),
                pair("X-Api-Key", "secret"),
            ]
        );
    }

    #[test]
    fn test_remove_missing_header_is_noop() {
        let headers = DefaultHeaders::new();
        let before = headers.snapshot();
        assert!(headers.remove("X-Never-Added").is_none());
        assert_eq!(*headers.snapshot(), *before);
    }

    #[test]
    fn test_remove_existing_header() {
        let headers = DefaultHeaders::with_headers([("X-Api-Key", "secret")]);
        assert_eq!(headers.remove("x-api-key").as_deref(), Some("secret"));
        assert!(headers.get("X-Api-Key").is_none());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let headers = DefaultHeaders::new();
        let snapshot = headers.snapshot();
        headers.insert("X-Later", "1");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(headers.snapshot().len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let headers = DefaultHeaders::new();
        let clone = headers.clone();
        clone.insert("X-Shared", "yes");
        assert_eq!(headers.get("X-Shared").as_deref(), Some("yes"));
    }

    #[test]
    fn test_merge_headers_per_call_wins() {
        let defaults = vec![pair("Content-Type", "application/json"), pair("X-A", "1")];
        let overrides = vec![pair("x-a", "2"), pair("X-B", "3")];
        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(
            merged,
            vec![
                pair("Content-Type", "application/json"),
                pair("X-A", "2"),
                pair("X-B", "3"),
            ]
        );
    }

    #[test]
    fn test_concurrent_mutation_never_tears() {
        let headers = DefaultHeaders::new();
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let headers = headers.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        headers.insert(format!("X-{i}"), j.to_string());
                    }
                })
            })
            .collect();
        for _ in 0..100 {
            let snapshot = headers.snapshot();
            assert_eq!(snapshot[0].0, "Content-Type");
        }
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(headers.snapshot().len(), 5);
        assert_eq!(headers.get("X-3").as_deref(), Some("99"));
    }
}
