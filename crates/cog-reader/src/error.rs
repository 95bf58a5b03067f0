//! Error types for raster access.

use ndvi_common::NdviError;
use thiserror::Error;

/// Errors that can occur while opening or reading a raster.
#[derive(Error, Debug)]
pub enum CogError {
    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// The bytes are not a well-formed TIFF.
    #[error("invalid TIFF: {0}")]
    InvalidTiff(String),

    /// A TIFF feature this reader does not handle.
    #[error("unsupported TIFF: {0}")]
    Unsupported(String),

    /// A tile or strip could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No raster is registered under this URL.
    #[error("raster not found: {0}")]
    NotFound(String),
}

impl CogError {
    /// Create an InvalidTiff error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidTiff(msg.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<std::io::Error> for CogError {
    fn from(err: std::io::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<CogError> for NdviError {
    fn from(err: CogError) -> Self {
        NdviError::UpstreamFetch(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, CogError>;

/// Drop the query string from a URL so credentials never reach logs or errors.
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => url.to_string(),
    }
}
