//! Default User-Agent for outgoing requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/ciathefed/retrieve";

/// Default User-Agent, overridden by an explicit `User-Agent` header.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("retrieve/{version} (+{PROJECT_UA_URL})")
}
