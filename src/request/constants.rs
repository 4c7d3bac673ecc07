//! Defaults for new builders and the method allow-list.

use std::time::Duration;

/// Default whole-request timeout (10 seconds, connect through body read).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default output location: the current directory.
pub const DEFAULT_OUTPUT: &str = "./";

/// Default method for new builders.
pub const DEFAULT_METHOD: &str = "GET";

/// Methods accepted by `exec`, compared case-insensitively.
pub const VALID_METHODS: [&str; 4] = ["GET", "POST", "PUT", "PATCH"];

/// Content type forced onto requests carrying a JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Filename used when neither the response nor the URL suggests one.
pub(crate) const FALLBACK_FILENAME: &str = "download";
