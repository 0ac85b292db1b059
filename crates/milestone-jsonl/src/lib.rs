//! Resilient JSON Lines reading for issue tracker exports.
//!
//! Exports are written one record per line. A single damaged line should not
//! cost the whole file, so the reader skips lines it cannot decode and reports
//! them as [`Warning`]s next to the records it did decode.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod warning;

pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl_resilient};
pub use warning::Warning;
