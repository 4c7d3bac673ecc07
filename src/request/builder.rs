//! Fluent request builder.
//!
//! Configuration methods take the builder by value and hand it back so calls
//! chain. The first configuration failure freezes the builder: later
//! configuration is ignored and [`RequestBuilder::exec`] returns that failure
//! without contacting the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::body::{Body, BodyReader};
use super::client::{self, PreparedRequest, SavedResponse};
use super::constants::{DEFAULT_METHOD, DEFAULT_OUTPUT, DEFAULT_TIMEOUT, JSON_CONTENT_TYPE};
use super::context::Context;
use super::error::{ConfigError, RequestError};
use super::query::{canonical_url, merge_query_params};
use super::validation::{parse_method, parse_request_url};

/// Whether the builder still accepts configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BuilderState {
    Open,
    Errored(ConfigError),
}

/// Accumulates the parameters of one HTTP request and saves its response.
///
/// # Example
///
/// ```no_run
/// use retrieve::RequestBuilder;
///
/// # async fn example() -> Result<(), retrieve::RequestError> {
/// let saved = RequestBuilder::new("https://cataas.com/cat")
///     .set_output("cat.png")
///     .exec()
///     .await?;
/// println!("saved {} bytes to {}", saved.bytes_written, saved.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "a request builder does nothing until `exec` is awaited"]
pub struct RequestBuilder {
    url: String,
    method: String,
    headers: HashMap<String, String>,
    body: Option<BodyReader>,
    context: Context,
    timeout: Duration,
    output: PathBuf,
    ignore_status_code: bool,
    state: BuilderState,
}

impl RequestBuilder {
    /// Creates a builder for `url` with default settings.
    ///
    /// Defaults: method `GET`, no headers, no body, background context,
    /// 10 second timeout, output `./`, error statuses not ignored.
    /// The URL is not validated until it is used.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            headers: HashMap::new(),
            body: None,
            context: Context::background(),
            timeout: DEFAULT_TIMEOUT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            ignore_status_code: false,
            state: BuilderState::Open,
        }
    }

    /// Runs `apply` unless a configuration error has been recorded.
    fn configure(mut self, apply: impl FnOnce(&mut Self)) -> Self {
        if self.state == BuilderState::Open {
            apply(&mut self);
        }
        self
    }

    fn record_error(&mut self, err: ConfigError) {
        warn!(error = %err, "builder configuration failed; further configuration is ignored");
        self.state = BuilderState::Errored(err);
    }

    /// Sets the HTTP method.
    ///
    /// Stored verbatim; `exec` accepts GET, POST, PUT and PATCH in any case.
    pub fn set_method(self, method: impl Into<String>) -> Self {
        self.configure(|b| b.method = method.into())
    }

    /// Adds or replaces a header.
    pub fn set_header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configure(|b| {
            b.headers.insert(key.into(), value.into());
        })
    }

    /// Adds or replaces several headers.
    pub fn set_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.configure(|b| {
            b.headers
                .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        })
    }

    /// Sets the request body, replacing any previous one.
    ///
    /// Text and bytes are sent verbatim and leave headers alone. A
    /// [`Body::Json`] forces `Content-Type: application/json`.
    pub fn set_body(self, body: impl Into<Body>) -> Self {
        self.configure(|b| b.attach_body(body.into()))
    }

    /// Serializes `value` to JSON and uses it as the body.
    ///
    /// Sets `Content-Type: application/json`. A value that cannot be
    /// serialized is a programming error: it is recorded as a fatal
    /// [`ConfigError::BodyEncoding`] (see [`RequestError::is_fatal`]).
    pub fn set_json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.configure(|b| match Body::json(value) {
            Ok(body) => b.attach_body(body),
            Err(e) => {
                error!(error = %e, "request body cannot be encoded as JSON");
                b.record_error(ConfigError::body_encoding(&e));
            }
        })
    }

    fn attach_body(&mut self, body: Body) {
        if body.is_json() {
            self.headers
                .retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
            self.headers
                .insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        }
        self.body = Some(BodyReader::new(body));
    }

    /// Sets the context whose cancellation or deadline aborts the request.
    pub fn set_context(self, context: Context) -> Self {
        self.configure(|b| b.context = context)
    }

    /// Sets the whole-request timeout (connect through body read).
    ///
    /// [`Duration::ZERO`] disables the timeout.
    pub fn set_timeout(self, timeout: Duration) -> Self {
        self.configure(|b| b.timeout = timeout)
    }

    /// Sets where the response is saved.
    ///
    /// An existing directory receives a file named from the response;
    /// any other path is written as-is.
    pub fn set_output(self, output: impl Into<PathBuf>) -> Self {
        self.configure(|b| b.output = output.into())
    }

    /// Adds a query parameter, replacing any existing values for `key`.
    pub fn set_query_param(self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.set_query_params([(key, value)])
    }

    /// Adds several query parameters, replacing existing values per key.
    ///
    /// The stored URL is parsed and re-serialized; if it cannot be parsed the
    /// failure is recorded and the builder is frozen.
    pub fn set_query_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.configure(|b| match merge_query_params(&b.url, params) {
            Ok(url) => b.url = url,
            Err(err) => b.record_error(err),
        })
    }

    /// Saves the response body even when the status code is 400 or above.
    pub fn ignore_status_code(self) -> Self {
        self.configure(|b| b.ignore_status_code = true)
    }

    /// The stored URL, as set or last re-serialized.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The stored method, unvalidated.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The configured headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The configured output path.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Whether error statuses are saved instead of rejected.
    #[must_use]
    pub fn ignores_status_code(&self) -> bool {
        self.ignore_status_code
    }

    /// The recorded configuration error, if the builder is frozen.
    #[must_use]
    pub fn error(&self) -> Option<&ConfigError> {
        match &self.state {
            BuilderState::Open => None,
            BuilderState::Errored(err) => Some(err),
        }
    }

    /// Drains the body into a string.
    ///
    /// Draining consumes the body: a second call returns an empty string,
    /// and a later `exec` sends an empty body. Bytes that are not UTF-8 are
    /// replaced with U+FFFD.
    #[must_use = "the body is drained even if the returned text is dropped"]
    pub fn body(&mut self) -> String {
        self.body
            .as_mut()
            .map(|reader| String::from_utf8_lossy(&reader.drain()).into_owned())
            .unwrap_or_default()
    }

    /// Returns the canonical form of the stored URL.
    ///
    /// Absolute URLs are normalized; relative references come back as stored.
    ///
    /// # Errors
    ///
    /// Returns the recorded configuration error, or
    /// [`ConfigError::InvalidUrl`] when the stored URL does not parse.
    pub fn build_url(&self) -> Result<String, RequestError> {
        if let BuilderState::Errored(err) = &self.state {
            return Err(err.clone().into());
        }
        Ok(canonical_url(&self.url)?)
    }

    /// Sends the request and writes the response body to the output path.
    ///
    /// Steps, each of which stops at the first failure:
    /// 1. a recorded configuration error is returned as-is;
    /// 2. the URL must be absolute with a host, the method one of
    ///    GET/POST/PUT/PATCH, and every header sendable;
    /// 3. the request is sent, racing the configured context;
    /// 4. a status of 400 or above fails unless [`Self::ignore_status_code`]
    ///    was set;
    /// 5. the body is streamed to the resolved output file.
    ///
    /// Nothing is retried, and a partially written file is left in place.
    ///
    /// # Errors
    ///
    /// See [`RequestError`] for the failure kinds.
    #[instrument(skip(self), fields(url = %self.url, method = %self.method))]
    pub async fn exec(&mut self) -> Result<SavedResponse, RequestError> {
        if let BuilderState::Errored(err) = &self.state {
            return Err(err.clone().into());
        }

        let url = parse_request_url(&self.url).ok_or_else(|| RequestError::invalid_url(&self.url))?;
        let method =
            parse_method(&self.method).ok_or_else(|| RequestError::invalid_method(&self.method))?;
        let headers = client::header_map(&self.headers)?;
        let body = self.body.as_mut().map(BodyReader::drain);

        debug!("sending request");
        let request = PreparedRequest {
            method,
            url: url.clone(),
            headers,
            body,
            timeout: (!self.timeout.is_zero()).then_some(self.timeout),
        };
        let response = client::send(request, &self.context).await?;

        let status = response.status().as_u16();
        if status >= 400 {
            if !self.ignore_status_code {
                return Err(RequestError::http_status(url.as_str(), status));
            }
            debug!(status, "saving error response body");
        }

        let saved = client::save_response(response, &self.output, &url, &self.context).await?;
        info!(
            path = %saved.path.display(),
            bytes = saved.bytes_written,
            status = saved.status,
            "response saved"
        );
        Ok(saved)
    }
}
