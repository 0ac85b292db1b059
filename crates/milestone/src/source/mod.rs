//! Issue retrieval.
//!
//! Issues are fetched a week at a time through an [`IssueSource`]. Each
//! week's query is checked against the configured page limit: a page that
//! comes back at the limit has probably been cut short by the service, and
//! retrieval fails rather than report a silently incomplete data set.

pub mod export;
pub mod window;

pub use export::{ExportSource, LoadWarning};
pub use window::{SearchQuery, SearchWindow, weekly_windows};

use crate::config::QueryConfig;
use crate::domain::{CustomField, IssueRecord, RawIssue};
use crate::error::{Error, ParseError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;

/// Something that can answer a search query with raw issues.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Run one search and return every issue it matched.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawIssue>>;
}

/// The queries retrieval runs, oldest window first.
pub fn plan_queries(config: &QueryConfig, end: NaiveDate) -> Vec<SearchQuery> {
    weekly_windows(config.start, end)
        .into_iter()
        .map(|window| SearchQuery {
            project: config.project.clone(),
            window,
            done_only: config.done_only,
        })
        .collect()
}

/// Fetch every issue created between `config.start` and `end`.
///
/// # Errors
///
/// Returns [`Error::PaginationLimitExceeded`] when a window returns
/// `config.page_limit` or more issues, and passes through source errors.
pub async fn retrieve_issues(
    source: &dyn IssueSource,
    config: &QueryConfig,
    end: NaiveDate,
) -> Result<Vec<RawIssue>> {
    let mut issues = Vec::new();

    for query in plan_queries(config, end) {
        tracing::info!(window = %query.window, jql = %query.jql(), "Executing search query");
        let page = source.search(&query).await?;

        if page.len() >= config.page_limit {
            return Err(Error::PaginationLimitExceeded {
                window: query.window,
                count: page.len(),
                limit: config.page_limit,
            });
        }

        tracing::debug!(window = %query.window, count = page.len(), "Search returned");
        issues.extend(page);
    }

    Ok(issues)
}

/// An issue left out of a batch because it could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWarning {
    /// Issue key.
    pub key: String,
    /// Why the issue was skipped.
    pub error: ParseError,
}

impl fmt::Display for RecordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Normalize a batch of raw issues.
///
/// An issue that fails to parse is logged, reported as a [`RecordWarning`]
/// and skipped; it never costs the rest of the batch.
pub fn build_records(
    raws: &[RawIssue],
    fields: &[CustomField],
) -> (Vec<IssueRecord>, Vec<RecordWarning>) {
    let mut records = Vec::with_capacity(raws.len());
    let mut warnings = Vec::new();

    for raw in raws {
        match IssueRecord::from_raw(raw, fields) {
            Ok(record) => {
                tracing::debug!(
                    key = %record.key,
                    transitions = record.state_transitions().len(),
                    "Built issue record"
                );
                records.push(record);
            }
            Err(error) => {
                tracing::warn!(key = %raw.key, %error, "Skipping issue");
                warnings.push(RecordWarning {
                    key: raw.key.clone(),
                    error,
                });
            }
        }
    }

    (records, warnings)
}
