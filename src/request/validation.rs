//! Pre-flight checks run by `exec` before any network call.

use reqwest::Method;
use url::Url;

use super::constants::VALID_METHODS;

/// Parses `raw` as an absolute URL with a scheme and a non-empty host.
pub(crate) fn parse_request_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw).ok()?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    has_host.then_some(parsed)
}

/// Matches `method` against the allow-list, ignoring case.
///
/// The returned method is upper-cased, so `"patch"` is sent as `PATCH`.
pub(crate) fn parse_method(method: &str) -> Option<Method> {
    let upper = method.to_ascii_uppercase();
    if !VALID_METHODS.contains(&upper.as_str()) {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_absolute_http_urls() {
        assert!(parse_request_url("http://example.com").is_some());
        assert!(parse_request_url("https://127.0.0.1:8080/file.txt?x=1").is_some());
    }

    #[test]
    fn test_rejects_urls_without_scheme_or_host() {
        for raw in [":://invalid-url", "/relative/path", "example.com/file", "mailto:a@b.c", ""] {
            assert!(parse_request_url(raw).is_none(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_accepts_allowed_methods_any_case() {
        for method in ["GET", "get", "Post", "pUt", "patch"] {
            let parsed = parse_method(method);
            assert!(parsed.is_some(), "{method} should be accepted");
            assert_eq!(parsed.unwrap().as_str(), method.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_rejects_other_methods() {
        for method in ["DELETE", "HEAD", "OPTIONS", "", "GETS", "G ET"] {
            assert!(parse_method(method).is_none(), "{method} should be rejected");
        }
    }
}
