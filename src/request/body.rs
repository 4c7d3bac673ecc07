//! Request bodies.
//!
//! A [`Body`] says what the caller supplied; once attached to a builder it is
//! held in a [`BodyReader`] that hands its bytes out exactly once.

use serde::Serialize;

/// A request body, tagged by how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Text sent verbatim.
    Text(String),
    /// Raw bytes sent verbatim.
    Bytes(Vec<u8>),
    /// A value already serialized to JSON; forces `Content-Type: application/json`.
    Json(Vec<u8>),
}

impl Body {
    /// Serializes `value` to a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error for values JSON cannot represent
    /// (for example maps with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(value).map(Self::Json)
    }

    /// Returns true for JSON bodies.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Consumes the body, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) | Self::Json(bytes) => bytes,
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// One-shot source for a builder's body.
///
/// Draining is destructive: after [`BodyReader::drain`] the reader is empty,
/// so a builder that is read or executed twice sends an empty body the
/// second time.
#[derive(Debug, Default)]
pub(crate) struct BodyReader {
    remaining: Vec<u8>,
}

impl BodyReader {
    pub(crate) fn new(body: Body) -> Self {
        Self {
            remaining: body.into_bytes(),
        }
    }

    /// Takes every byte not yet consumed.
    pub(crate) fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.remaining)
    }
}
