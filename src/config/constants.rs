//! Constants for client configuration (timeouts, headers, redirects).

use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Name of the header that selects the request body media type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Media type sent when the caller does not override `Content-Type`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Maximum redirect hops followed by the bundled transport.
pub const MAX_REDIRECTS: usize = 5;
