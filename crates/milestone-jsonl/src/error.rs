//! Error types for milestone-jsonl operations.

use std::io;
use thiserror::Error;

/// Fatal errors while reading an export.
///
/// Per-line decoding problems are not errors; they surface as
/// [`Warning`](crate::Warning)s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while opening or reading the export.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error outside of per-line decoding.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not line-delimited JSON at all.
    #[error("Invalid JSONL format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for milestone-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
