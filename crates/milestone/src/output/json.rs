//! JSON views of issue records.
//!
//! Records hold parsed timestamps and cached state that are not meant to be
//! serialized wholesale; these borrowed views pick the reported fields.

use crate::domain::{FieldValue, IssueRecord, Lifecycle, TransitionEvent};
use crate::source::SearchQuery;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
pub(crate) struct IssueSummaryJson<'a> {
    key: &'a str,
    issue_type: Option<&'a str>,
    status: Option<&'a str>,
    summary: &'a str,
    created: NaiveDate,
    resolved: Option<NaiveDate>,
    custom_fields: &'a BTreeMap<String, FieldValue>,
}

impl<'a> From<&'a IssueRecord> for IssueSummaryJson<'a> {
    fn from(record: &'a IssueRecord) -> Self {
        Self {
            key: &record.key,
            issue_type: record.issue_type.as_deref(),
            status: record.status.as_deref(),
            summary: &record.summary,
            created: record.created_date(),
            resolved: record.resolution_date(),
            custom_fields: record.custom_fields(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TransitionJson<'a> {
    timestamp: DateTime<FixedOffset>,
    from: Option<&'a str>,
    from_id: Option<&'a str>,
    to: Option<&'a str>,
    to_id: Option<&'a str>,
}

impl<'a> From<&'a TransitionEvent> for TransitionJson<'a> {
    fn from(event: &'a TransitionEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            from: event.from_state.as_deref(),
            from_id: event.from_state_id.as_deref(),
            to: event.to_state.as_deref(),
            to_id: event.to_state_id.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IssueDetailsJson<'a> {
    #[serde(flatten)]
    summary: IssueSummaryJson<'a>,
    project: Option<&'a str>,
    assignee: Option<&'a str>,
    created_at: DateTime<FixedOffset>,
    resolved_at: Option<DateTime<FixedOffset>>,
    transitions: Vec<TransitionJson<'a>>,
    lifecycle: &'a Lifecycle,
}

#[derive(Debug, Serialize)]
pub(crate) struct LifecycleJson<'a> {
    key: &'a str,
    #[serde(flatten)]
    lifecycle: &'a Lifecycle,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryJson {
    start: NaiveDate,
    end: NaiveDate,
    jql: String,
}

fn write_pretty<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

pub(crate) fn print_issues_json<W: Write>(w: &mut W, records: &[IssueRecord]) -> io::Result<()> {
    let views: Vec<IssueSummaryJson<'_>> = records.iter().map(IssueSummaryJson::from).collect();
    write_pretty(w, &views)
}

pub(crate) fn print_issue_details_json<W: Write>(w: &mut W, record: &IssueRecord) -> io::Result<()> {
    let sorted = record.state_transitions().sorted_by_time();
    let view = IssueDetailsJson {
        summary: IssueSummaryJson::from(record),
        project: record.project.as_deref(),
        assignee: record.assignee.as_deref(),
        created_at: record.created,
        resolved_at: record.resolved,
        transitions: sorted.iter().map(TransitionJson::from).collect(),
        lifecycle: record.lifecycle(),
    };
    write_pretty(w, &view)
}

pub(crate) fn print_lifecycles_json<W: Write>(w: &mut W, records: &[IssueRecord]) -> io::Result<()> {
    let views: Vec<LifecycleJson<'_>> = records
        .iter()
        .map(|record| LifecycleJson {
            key: &record.key,
            lifecycle: record.lifecycle(),
        })
        .collect();
    write_pretty(w, &views)
}

pub(crate) fn print_queries_json<W: Write>(w: &mut W, queries: &[SearchQuery]) -> io::Result<()> {
    let views: Vec<QueryJson> = queries
        .iter()
        .map(|query| QueryJson {
            start: query.window.start,
            end: query.window.end,
            jql: query.jql(),
        })
        .collect();
    write_pretty(w, &views)
}

pub(crate) fn print_value_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    write_pretty(w, value)
}
