//! Error types for the request module.
//!
//! Errors are split by when they can happen: [`ConfigError`] is recorded while
//! the builder is being configured and sticks until execution, while
//! [`RequestError`] covers everything `exec` can fail with.

use std::path::PathBuf;

use thiserror::Error;

/// Why a [`Context`](super::Context) stopped an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was cancelled through its [`CancelHandle`](super::CancelHandle).
    #[error("context canceled")]
    Cancelled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// The first configuration failure recorded by a builder.
///
/// Once recorded, the builder ignores further configuration and `exec`
/// returns this error without touching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The stored URL could not be parsed while mutating its query string.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A JSON body value could not be serialized.
    ///
    /// This is a programming error in the caller, not a runtime condition;
    /// see [`RequestError::is_fatal`].
    #[error("failed to encode body to JSON: {message}")]
    BodyEncoding {
        /// The serializer's error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid URL configuration error.
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Creates a body encoding error from a serializer failure.
    pub fn body_encoding(source: &serde_json::Error) -> Self {
        Self::BodyEncoding {
            message: source.to_string(),
        }
    }
}

/// Errors that can occur while building or executing a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A sticky configuration error recorded before execution.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The URL is not absolute or has no host.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The method is not one of GET, POST, PUT, PATCH.
    #[error("invalid method: {method}")]
    InvalidMethod {
        /// The rejected method string.
        method: String,
    },

    /// A header name or value cannot be sent over HTTP.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL being requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured timeout elapsed before the response was fully read.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The request context was cancelled or its deadline passed.
    #[error("request to {url} aborted: {source}")]
    Aborted {
        /// The URL being requested.
        url: String,
        /// Why the context stopped the request.
        #[source]
        source: ContextError,
    },

    /// The server answered with a status code of 400 or above.
    #[error("received status code {status} from {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while resolving or writing the output file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl RequestError {
    /// Creates an invalid URL validation error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid method validation error.
    pub fn invalid_method(method: impl Into<String>) -> Self {
        Self::InvalidMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a network error, promoting reqwest timeouts to [`Self::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an aborted-by-context error.
    pub fn aborted(url: impl Into<String>, source: ContextError) -> Self {
        Self::Aborted {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that signal a programming mistake rather
    /// than a runtime failure (currently a body that cannot be encoded).
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(ConfigError::BodyEncoding { .. }))
    }

    /// Returns true when `exec` rejected the request before any network call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl { .. } | Self::InvalidMethod { .. } | Self::InvalidHeader { .. }
        )
    }

    /// The HTTP status code carried by a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Network and IO variants carry the URL or path they failed on, so there is no
// blanket `From<reqwest::Error>` or `From<std::io::Error>`; use the helper
// constructors instead.
