//! Default User-Agent for the bundled transport.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/restclient";

/// Default User-Agent, identifying the crate and its version.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("restclient/{version} (+{PROJECT_UA_URL})")
}
