//! Query-string mutation for stored URLs.
//!
//! Stored URLs may be absolute (`http://host/path`) or relative references
//! (`/api/items`). Absolute URLs go through [`Url`] and come back in its
//! canonical form; relative references keep their path and fragment as
//! written and only have their query rebuilt.

use std::collections::BTreeMap;

use url::form_urlencoded::{self, Serializer};
use url::{ParseError, Url};

use super::error::ConfigError;

/// A stored URL split into the pieces query mutation touches.
enum Target {
    Absolute(Url),
    Relative {
        path: String,
        query: Option<String>,
        fragment: Option<String>,
    },
}

impl Target {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match Url::parse(raw) {
            Ok(url) => Ok(Self::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) if is_relative_reference(raw) => {
                Ok(split_relative(raw))
            }
            Err(source) => Err(ConfigError::invalid_url(raw, source)),
        }
    }

    fn query(&self) -> Option<&str> {
        match self {
            Self::Absolute(url) => url.query(),
            Self::Relative { query, .. } => query.as_deref(),
        }
    }

    fn set_query(&mut self, new_query: Option<String>) {
        match self {
            Self::Absolute(url) => url.set_query(new_query.as_deref()),
            Self::Relative { query, .. } => *query = new_query,
        }
    }

    fn into_string(self) -> String {
        match self {
            Self::Absolute(url) => url.into(),
            Self::Relative {
                mut path,
                query,
                fragment,
            } => {
                if let Some(query) = query {
                    path.push('?');
                    path.push_str(&query);
                }
                if let Some(fragment) = fragment {
                    path.push('#');
                    path.push_str(&fragment);
                }
                path
            }
        }
    }
}

/// RFC 3986 §4.2: the first segment of a relative-path reference cannot
/// contain a colon, otherwise it would read as a scheme.
fn is_relative_reference(raw: &str) -> bool {
    let first_segment = raw.split(['/', '?', '#']).next().unwrap_or("");
    !first_segment.contains(':')
}

fn split_relative(raw: &str) -> Target {
    let (rest, fragment) = match raw.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment.to_string())),
        None => (raw, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (rest, None),
    };
    Target::Relative {
        path: path.to_string(),
        query,
        fragment,
    }
}

/// Parses and re-serializes `raw_url` without changing it.
pub(crate) fn canonical_url(raw_url: &str) -> Result<String, ConfigError> {
    Target::parse(raw_url).map(Target::into_string)
}

/// Merges `params` into the query string of `raw_url` and re-serializes it.
///
/// A key given in `params` replaces every existing value for that key. Keys
/// are written in sorted order; values of untouched repeated keys keep their
/// relative order.
pub(crate) fn merge_query_params<I, K, V>(raw_url: &str, params: I) -> Result<String, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut target = Target::parse(raw_url)?;

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(existing) = target.query() {
        for (key, value) in form_urlencoded::parse(existing.as_bytes()) {
            query
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }
    for (key, value) in params {
        query.insert(key.as_ref().to_string(), vec![value.as_ref().to_string()]);
    }

    if query.is_empty() {
        target.set_query(None);
    } else {
        let mut serializer = Serializer::new(String::new());
        for (key, values) in &query {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        target.set_query(Some(serializer.finish()));
    }

    Ok(target.into_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_query_to_bare_url() {
        let url = merge_query_params("http://example.com", [("key", "value")]).unwrap();
        assert_eq!(url, "http://example.com/?key=value");
    }

    #[test]
    fn test_same_key_overwrites() {
        let url = merge_query_params("http://example.com", [("key", "first")]).unwrap();
        let url = merge_query_params(&url, [("key", "second")]).unwrap();
        assert_eq!(url.matches("key=").count(), 1);
        assert!(url.ends_with("?key=second"), "got {url}");
    }

    #[test]
    fn test_keys_are_sorted() {
        let url =
            merge_query_params("http://example.com/search?zeta=1", [("alpha", "2"), ("mid", "3")])
                .unwrap();
        assert_eq!(url, "http://example.com/search?alpha=2&mid=3&zeta=1");
    }

    #[test]
    fn test_repeated_keys_replaced_as_a_whole() {
        let url = merge_query_params("http://example.com/?tag=a&tag=b&keep=1&keep=2", [("tag", "c")])
            .unwrap();
        assert_eq!(url, "http://example.com/?keep=1&keep=2&tag=c");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let url = merge_query_params("http://example.com", [("q", "a b&c=d")]).unwrap();
        assert_eq!(url, "http://example.com/?q=a+b%26c%3Dd");
    }

    #[test]
    fn test_preserves_fragment() {
        let url = merge_query_params("http://example.com/page#top", [("k", "v")]).unwrap();
        assert_eq!(url, "http://example.com/page?k=v#top");
    }

    #[test]
    fn test_relative_url_gets_query() {
        let url = merge_query_params("/api/items", [("key", "value")]).unwrap();
        assert_eq!(url, "/api/items?key=value");
    }

    #[test]
    fn test_relative_url_merges_existing_query_and_keeps_fragment() {
        let url = merge_query_params("api/items?x=1&key=old#part", [("key", "new")]).unwrap();
        assert_eq!(url, "api/items?key=new&x=1#part");
    }

    #[test]
    fn test_canonical_url_forms() {
        assert_eq!(canonical_url("/api/items?x=1").unwrap(), "/api/items?x=1");
        assert_eq!(
            canonical_url("HTTP://Example.COM/a/../b").unwrap(),
            "http://example.com/b"
        );
        assert!(canonical_url(":://invalid-url").is_err());
    }

    #[test]
    fn test_unparsable_url_is_config_error() {
        for raw in [":://invalid-url", "::not a url"] {
            let err = merge_query_params(raw, [("k", "v")]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidUrl { ref url, .. } if url == raw),
                "{raw}: got {err:?}"
            );
        }
    }
}
