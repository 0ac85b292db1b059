//! JSONL reading operations.
//!
//! [`JsonlReader`] walks a buffered async reader line by line, tracking line
//! numbers for warnings. [`read_jsonl_resilient`] is the one-call entry point
//! used for export files.

use crate::error::{Error, Result};
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async line reader for JSONL data.
///
/// # Examples
///
/// ```no_run
/// use milestone_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("issues.jsonl").await?;
/// let (records, warnings) = JsonlReader::new(file)
///     .read_all_resilient::<serde_json::Value>()
///     .await?;
/// println!("{} records, {} warnings", records.len(), warnings.len());
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based number of the last line read, 0 before any read.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    ///
    /// Issues with long changelogs make for long lines; a larger buffer saves
    /// reallocations on big exports.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
        }
    }

    /// Returns the 1-based number of the last line read (0 before any read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line, trimmed.
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying reader fails or the line is not
    /// valid UTF-8.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        match self.next_raw_line().await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into()),
            None => Ok(None),
        }
    }

    /// Reads the next non-blank line as trimmed bytes, without decoding it.
    async fn next_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = buf.trim_ascii();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_vec()));
            }
        }
    }

    /// Decodes every remaining line, skipping the ones that fail.
    ///
    /// Syntax errors, including bytes that are not UTF-8, become
    /// [`Warning::MalformedJson`]; well-formed JSON that
    /// does not deserialize into `T` becomes [`Warning::SkippedLine`]. Blank
    /// lines are ignored silently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on read failures and [`Error::InvalidFormat`] if
    /// the first record line opens a JSON array, which means the input is a
    /// plain JSON document rather than JSON Lines.
    pub async fn read_all_resilient<T: DeserializeOwned>(
        mut self,
    ) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut records = Vec::new();
        let mut warnings = Vec::new();
        let mut first = true;

        while let Some(line) = self.next_raw_line().await? {
            if first && line.first() == Some(&b'[') {
                return Err(Error::InvalidFormat(format!(
                    "line {} opens a JSON array; expected one record per line",
                    self.line_number
                )));
            }
            first = false;

            let value: serde_json::Value = match serde_json::from_slice(&line) {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!(line = self.line_number, error = %e, "Malformed JSONL line");
                    warnings.push(Warning::MalformedJson {
                        line_number: self.line_number,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!(line = self.line_number, error = %e, "JSONL record rejected");
                    warnings.push(Warning::SkippedLine {
                        line_number: self.line_number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok((records, warnings))
    }
}

/// Reads a JSONL file, returning decoded records and per-line warnings.
///
/// # Errors
///
/// Fails only when the file cannot be opened or read, or is not JSON Lines;
/// see [`JsonlReader::read_all_resilient`].
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).await?;
    let (records, warnings) = JsonlReader::new(file).read_all_resilient().await?;

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        warnings = warnings.len(),
        "Read JSONL file"
    );

    Ok((records, warnings))
}
