//! Retrieve Library
//!
//! A fluent helper for issuing a single HTTP request and saving the response
//! body to disk.
//!
//! # Architecture
//!
//! - [`request`] - the request builder, its body and context types, and the
//!   transport that streams responses to files

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod request;
mod user_agent;

// Re-export commonly used types
pub use request::{
    Body, CancelHandle, ConfigError, Context, ContextError, RequestBuilder, RequestError,
    SavedResponse,
};

/// Creates a [`RequestBuilder`] for `url`.
pub fn new(url: impl Into<String>) -> RequestBuilder {
    RequestBuilder::new(url)
}
