//! Transport for a single request: send it, then stream the response to disk.
//!
//! Both network phases (waiting for the response head and reading body
//! chunks) race against the request [`Context`]; file writes are never
//! interrupted once issued.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;
use url::Url;

use super::context::Context;
use super::error::RequestError;
use super::filename::derive_filename;
use crate::user_agent;

/// Where a response body ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResponse {
    /// The file the body was written to.
    pub path: PathBuf,
    /// The response status code.
    pub status: u16,
    /// Number of body bytes written.
    pub bytes_written: u64,
}

/// A validated request ready to hand to the transport.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
    /// `None` leaves the request without a timeout.
    pub(crate) timeout: Option<Duration>,
}

/// Converts the builder's header map into transport headers.
pub(crate) fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RequestError::invalid_header(name.as_str(), e))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| RequestError::invalid_header(name.as_str(), e))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Sends `request` and waits for the response head.
pub(crate) async fn send(request: PreparedRequest, ctx: &Context) -> Result<Response, RequestError> {
    let url = request.url.to_string();
    let client = build_client().map_err(|e| RequestError::network(url.as_str(), e))?;

    let mut builder = client
        .request(request.method, request.url)
        .headers(request.headers);
    if let Some(timeout) = request.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    tokio::select! {
        biased;
        reason = ctx.done() => Err(RequestError::aborted(url, reason)),
        result = builder.send() => result.map_err(|e| RequestError::network(url.as_str(), e)),
    }
}

/// Resolves the destination for `response` and streams its body there.
pub(crate) async fn save_response(
    response: Response,
    output: &Path,
    url: &Url,
    ctx: &Context,
) -> Result<SavedResponse, RequestError> {
    let status = response.status().as_u16();
    let content_disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok());
    let path = resolve_output_path(output, content_disposition, url).await?;
    debug!(path = %path.display(), "resolved output path");

    let mut file = File::create(&path)
        .await
        .map_err(|e| RequestError::io(path.clone(), e))?;
    let bytes_written = stream_to_file(&mut file, response, url.as_str(), &path, ctx).await?;

    Ok(SavedResponse {
        path,
        status,
        bytes_written,
    })
}

/// An existing directory gets a derived filename; anything else is used verbatim.
async fn resolve_output_path(
    output: &Path,
    content_disposition: Option<&str>,
    url: &Url,
) -> Result<PathBuf, RequestError> {
    match tokio::fs::metadata(output).await {
        Ok(meta) if meta.is_dir() => Ok(output.join(derive_filename(content_disposition, url))),
        Ok(_) => Ok(output.to_path_buf()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(output.to_path_buf()),
        Err(e) => Err(RequestError::io(output, e)),
    }
}

/// Streams response body to file, returning bytes written.
///
/// A failure part-way leaves the partially written file in place.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    file_path: &Path,
    ctx: &Context,
) -> Result<u64, RequestError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            reason = ctx.done() => return Err(RequestError::aborted(url, reason)),
            next = stream.next() => next,
        };
        let Some(chunk_result) = next else {
            break;
        };
        let chunk = chunk_result.map_err(|e| RequestError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| RequestError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| RequestError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}
