//! Error types for milestone operations.

use crate::source::SearchWindow;
use std::io;
use thiserror::Error;

/// The error type for milestone operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A timestamp could not be interpreted.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The export file could not be read as JSON Lines.
    #[error("Export error: {0}")]
    Export(String),

    /// A search page came back at the service's result cap, so results were
    /// probably truncated and the window should be narrower.
    #[error(
        "Search for {window} returned {count} issues (limit {limit}); results are likely truncated"
    )]
    PaginationLimitExceeded {
        /// The window whose query hit the cap.
        window: SearchWindow,
        /// Number of issues returned.
        count: usize,
        /// Configured page limit.
        limit: usize,
    },

    /// Issue not found.
    #[error("Issue not found: {0}")]
    IssueNotFound(String),
}

/// A timestamp string that is not a recognizable date-time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized timestamp: '{input}'")]
pub struct ParseError {
    /// The offending input.
    pub input: String,
}

impl ParseError {
    /// Create a parse error for the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file is not valid YAML for the expected schema.
    #[error("Configuration error: {0}")]
    Yaml(String),

    /// The configuration parsed but holds unusable values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<milestone_jsonl::Error> for Error {
    fn from(err: milestone_jsonl::Error) -> Self {
        match err {
            milestone_jsonl::Error::Io(io_err) => Self::Io(io_err),
            milestone_jsonl::Error::Json(json_err) => Self::Json(json_err),
            milestone_jsonl::Error::InvalidFormat(msg) => Self::Export(msg),
        }
    }
}

/// A specialized Result type for milestone operations.
pub type Result<T> = std::result::Result<T, Error>;
