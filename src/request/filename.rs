//! Filename derivation for directory outputs.
//!
//! When the output path is a directory, the saved file is named after the
//! `Content-Disposition` filename if the server sends one, else after the last
//! segment of the request URL.

use std::path::{Component, Path};

use url::Url;

use super::constants::FALLBACK_FILENAME;

/// Picks the filename for a response saved into a directory.
///
/// The result is always a single safe path segment.
pub(crate) fn derive_filename(content_disposition: Option<&str>, url: &Url) -> String {
    content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .unwrap_or_else(|| filename_from_url(url))
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    // filename*= wins over filename= when both are present
    if let Some(value) = param_value(header, "filename*=") {
        // charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        }
    }

    let value = param_value(header, "filename=")?;

    if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        let filename = &stripped[..end];
        return (!filename.is_empty()).then(|| filename.to_string());
    }

    let end = value.find(';').unwrap_or(value.len());
    let filename = value[..end].trim();
    (!filename.is_empty()).then(|| filename.to_string())
}

/// Text after the first `name` that starts a parameter, trimmed.
///
/// A match counts only at the start of the header or after `;` or
/// whitespace, so `xfilename=` does not satisfy `filename=`.
fn param_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .match_indices(name)
        .find(|&(pos, _)| {
            header[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| c == ';' || c.is_whitespace())
        })
        .map(|(pos, _)| header[pos + name.len()..].trim())
}

/// Last non-empty URL path segment (percent-decoded), else the host.
pub(crate) fn filename_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(|last| {
            urlencoding::decode(last)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| last.to_string())
        });

    let candidate = segment.or_else(|| url.host_str().map(str::to_string));
    match candidate {
        Some(name) => sanitize_filename(&name),
        None => FALLBACK_FILENAME.to_string(),
    }
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) and neutralises `.`/`..`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
