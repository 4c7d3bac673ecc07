//! Fluent HTTP request building and response saving.
//!
//! A [`RequestBuilder`] collects a method, headers, query parameters, a body,
//! a timeout and a [`Context`], then `exec` sends the request and streams the
//! response body to a file.
//!
//! # Features
//!
//! - Chainable configuration with a sticky first configuration error
//! - Text, byte and JSON bodies
//! - Cancellation and deadlines through [`Context`]
//! - Output to a fixed file, or into a directory with the filename taken from
//!   `Content-Disposition` or the URL path
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use retrieve::RequestBuilder;
//!
//! # async fn example() -> Result<(), retrieve::RequestError> {
//! let saved = RequestBuilder::new("https://example.com/search")
//!     .set_query_param("q", "rust")
//!     .set_header("Accept", "text/html")
//!     .set_timeout(Duration::from_secs(30))
//!     .set_output("./downloads")
//!     .exec()
//!     .await?;
//! println!("Saved: {}", saved.path.display());
//! # Ok(())
//! # }
//! ```

mod body;
mod builder;
mod client;
mod constants;
mod context;
mod error;
mod filename;
mod query;
mod validation;

pub use body::Body;
pub use builder::RequestBuilder;
pub use client::SavedResponse;
pub use constants::{DEFAULT_METHOD, DEFAULT_OUTPUT, DEFAULT_TIMEOUT, JSON_CONTENT_TYPE, VALID_METHODS};
pub use context::{CancelHandle, Context};
pub use error::{ConfigError, ContextError, RequestError};
