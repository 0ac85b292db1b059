//! Normalized issue records.

use super::custom_field::{CustomField, FieldValue, STORY_POINTS, TEAM_ASSIGNED, WORK_CATEGORY};
use super::lifecycle::Lifecycle;
use super::raw::RawIssue;
use super::transition::{TransitionHistory, parse_timestamp};
use crate::error::ParseError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// One issue's static fields, configured custom fields and status history.
///
/// The transition history is extracted once, at construction. The lifecycle
/// is resolved on first access and cached for the record's lifetime.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    /// Unique issue key.
    pub key: String,

    /// Project key.
    pub project: Option<String>,

    /// Issue type name.
    pub issue_type: Option<String>,

    /// Assignee display name.
    pub assignee: Option<String>,

    /// Current status name.
    pub status: Option<String>,

    /// One-line summary.
    pub summary: String,

    /// Creation timestamp.
    pub created: DateTime<FixedOffset>,

    /// Resolution timestamp, `None` while unresolved.
    pub resolved: Option<DateTime<FixedOffset>>,

    custom_fields: BTreeMap<String, FieldValue>,
    transitions: TransitionHistory,
    lifecycle: OnceLock<Lifecycle>,
}

impl IssueRecord {
    /// Normalize a raw issue.
    ///
    /// Each configured custom field is read from its `customfield_<id>` key
    /// and passed through its mapper; a missing value maps to the mapper's
    /// empty result rather than an error. Unconfigured fields are dropped.
    /// When two descriptors share an internal name, the first one wins and
    /// the later one is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the creation or resolution timestamp, or the
    /// timestamp of any status change, cannot be parsed.
    pub fn from_raw(raw: &RawIssue, custom_fields: &[CustomField]) -> Result<Self, ParseError> {
        let fields = &raw.fields;

        let created = parse_timestamp(&fields.created)?;
        let resolved = fields
            .resolutiondate
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        let transitions = TransitionHistory::events_for(&raw.changelog)?;

        let mut mapped = BTreeMap::new();
        for cf in custom_fields {
            let field_name = cf.field_name();
            if mapped.contains_key(&field_name) {
                tracing::warn!(
                    issue = %raw.key,
                    field = %field_name,
                    field_key = %cf.field_key(),
                    "Duplicate custom field name, keeping the first descriptor"
                );
                continue;
            }
            let value = cf.mapper().apply(fields.get(&cf.field_key()));
            mapped.insert(field_name, value);
        }

        Ok(Self {
            key: raw.key.clone(),
            project: fields.project.as_ref().map(|p| p.key.clone()),
            issue_type: fields.issuetype.as_ref().map(|t| t.name.clone()),
            assignee: fields
                .assignee
                .as_ref()
                .and_then(|a| a.display_name.clone()),
            status: fields.status.as_ref().map(|s| s.name.clone()),
            summary: fields.summary.clone().unwrap_or_default(),
            created,
            resolved,
            custom_fields: mapped,
            transitions,
            lifecycle: OnceLock::new(),
        })
    }

    /// Calendar date of creation.
    pub fn created_date(&self) -> NaiveDate {
        self.created.date_naive()
    }

    /// Calendar date of resolution.
    pub fn resolution_date(&self) -> Option<NaiveDate> {
        self.resolved.map(|ts| ts.date_naive())
    }

    /// Status transitions in changelog order.
    pub fn state_transitions(&self) -> &TransitionHistory {
        &self.transitions
    }

    /// Milestone dates, resolved on first call.
    pub fn lifecycle(&self) -> &Lifecycle {
        self.lifecycle.get_or_init(|| {
            Lifecycle::resolve(
                self.created_date(),
                self.resolution_date(),
                &self.transitions,
            )
        })
    }

    /// Mapped value of a configured custom field, by internal name.
    pub fn custom_field(&self, field_name: &str) -> Option<&FieldValue> {
        self.custom_fields.get(field_name)
    }

    /// All configured custom fields, by internal name.
    pub fn custom_fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.custom_fields
    }

    /// Story points, when configured and set.
    pub fn story_points(&self) -> Option<i64> {
        self.custom_field(STORY_POINTS)
            .and_then(FieldValue::as_number)
    }

    /// Assigned team, when configured.
    pub fn team(&self) -> Option<&str> {
        self.custom_field(TEAM_ASSIGNED)
            .and_then(FieldValue::as_text)
    }

    /// Work category, when configured.
    pub fn category(&self) -> Option<&str> {
        self.custom_field(WORK_CATEGORY)
            .and_then(FieldValue::as_text)
    }
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.key)
    }
}
