//! An [`IssueSource`] backed by a JSON Lines export.
//!
//! Each line of the export is one issue in the service's REST shape. The
//! export is read once, up front; searches filter the loaded issues the way
//! the service would filter its own.

use super::IssueSource;
use super::window::SearchQuery;
use crate::domain::{RawIssue, parse_timestamp};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use milestone_jsonl::{Warning as JsonlWarning, read_jsonl_resilient};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Status category and resolution name of finished work.
const DONE: &str = "Done";

/// Problems found while loading an export.
///
/// None of these stop the load. The offending line or issue is left out and
/// the rest of the export is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line that is not a raw issue.
    MalformedJson {
        /// 1-based line in the export.
        line_number: usize,
        /// Decoder message.
        error: String,
    },

    /// An issue whose creation timestamp cannot be read, so it cannot be
    /// placed in any search window.
    InvalidIssueData {
        /// Issue key.
        key: String,
        /// What was wrong.
        error: String,
    },

    /// A second issue with a key already loaded. The first one wins.
    DuplicateIssue {
        /// Issue key.
        key: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: {error}")
            }
            Self::InvalidIssueData { key, error } => write!(f, "{key}: {error}"),
            Self::DuplicateIssue { key } => write!(f, "{key}: duplicate issue skipped"),
        }
    }
}

#[derive(Debug, Clone)]
struct ExportedIssue {
    created: NaiveDate,
    raw: RawIssue,
}

/// Issues loaded from an export file.
#[derive(Debug, Clone, Default)]
pub struct ExportSource {
    issues: Vec<ExportedIssue>,
    warnings: Vec<LoadWarning>,
}

impl ExportSource {
    /// Load an export file.
    ///
    /// Malformed lines, undatable issues and duplicate keys are skipped,
    /// logged at `warn` and kept in [`warnings`](Self::warnings).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, or if it is a
    /// JSON array rather than JSON Lines.
    pub async fn load(path: &Path) -> Result<Self> {
        let (raws, jsonl_warnings) = read_jsonl_resilient::<RawIssue, _>(path).await?;

        let mut warnings: Vec<LoadWarning> = jsonl_warnings
            .into_iter()
            .map(|warning| match warning {
                JsonlWarning::MalformedJson { line_number, error } => {
                    LoadWarning::MalformedJson { line_number, error }
                }
                // A valid JSON value of the wrong shape is as unusable as bad JSON
                JsonlWarning::SkippedLine {
                    line_number,
                    reason,
                } => LoadWarning::MalformedJson {
                    line_number,
                    error: reason,
                },
            })
            .collect();

        let mut source = Self::from_issues(raws);
        warnings.append(&mut source.warnings);
        source.warnings = warnings;

        for warning in &source.warnings {
            tracing::warn!(path = %path.display(), "Skipped export entry: {warning}");
        }
        tracing::info!(
            path = %path.display(),
            issues = source.len(),
            warnings = source.warnings.len(),
            "Loaded export"
        );

        Ok(source)
    }

    /// Build a source from issues already in memory.
    pub fn from_issues(raws: Vec<RawIssue>) -> Self {
        let mut seen = HashSet::new();
        let mut issues = Vec::with_capacity(raws.len());
        let mut warnings = Vec::new();

        for raw in raws {
            if !seen.insert(raw.key.clone()) {
                warnings.push(LoadWarning::DuplicateIssue { key: raw.key });
                continue;
            }
            match parse_timestamp(&raw.fields.created) {
                Ok(created) => issues.push(ExportedIssue {
                    created: created.date_naive(),
                    raw,
                }),
                Err(e) => warnings.push(LoadWarning::InvalidIssueData {
                    key: raw.key,
                    error: e.to_string(),
                }),
            }
        }

        Self { issues, warnings }
    }

    /// Non-fatal problems found while loading.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Number of usable issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether no usable issues were loaded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Every usable issue, in export order.
    pub fn issues(&self) -> impl Iterator<Item = &RawIssue> {
        self.issues.iter().map(|issue| &issue.raw)
    }

    /// Look up one issue by key, ignoring windows and filters.
    pub fn find(&self, key: &str) -> Option<&RawIssue> {
        self.issues().find(|raw| raw.key == key)
    }
}

fn matches(query: &SearchQuery, issue: &ExportedIssue) -> bool {
    let fields = &issue.raw.fields;

    let in_project = fields
        .project
        .as_ref()
        .is_some_and(|p| p.key.eq_ignore_ascii_case(&query.project));
    if !in_project || !query.window.contains(issue.created) {
        return false;
    }

    if query.done_only {
        let done_category = fields
            .status
            .as_ref()
            .and_then(|s| s.status_category.as_ref())
            .is_some_and(|c| c.name == DONE);
        let done_resolution = fields.resolution.as_ref().is_some_and(|r| r.name == DONE);
        return done_category && done_resolution;
    }

    true
}

#[async_trait]
impl IssueSource for ExportSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawIssue>> {
        Ok(self
            .issues
            .iter()
            .filter(|issue| matches(query, issue))
            .map(|issue| issue.raw.clone())
            .collect())
    }
}
