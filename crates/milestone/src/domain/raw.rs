//! Raw issue records as the ticket service exports them.
//!
//! These types mirror the service's REST shape closely so an export can be
//! read without a translation step. Everything the core does not rely on is
//! optional; custom fields are kept as untyped JSON until an
//! [`IssueRecord`](super::IssueRecord) maps them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One issue with its changelog expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    /// Issue key, e.g. `EN-1042`.
    pub key: String,

    /// Standard and custom fields.
    pub fields: RawFields,

    /// Field change history. Absent when the export was taken without
    /// changelog expansion.
    #[serde(default)]
    pub changelog: RawChangelog,
}

/// The `fields` object of a raw issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFields {
    /// Owning project.
    #[serde(default)]
    pub project: Option<RawProject>,

    /// Issue type.
    #[serde(default)]
    pub issuetype: Option<RawNamed>,

    /// Current assignee.
    #[serde(default)]
    pub assignee: Option<RawUser>,

    /// Current status.
    #[serde(default)]
    pub status: Option<RawStatus>,

    /// One-line summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// Creation timestamp.
    pub created: String,

    /// Resolution timestamp, null until resolved.
    #[serde(default)]
    pub resolutiondate: Option<String>,

    /// Resolution, null until resolved.
    #[serde(default)]
    pub resolution: Option<RawNamed>,

    /// Every other field, including `customfield_<id>` entries.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawFields {
    /// Look up a field by its raw key. Explicit JSON nulls read as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| !v.is_null())
    }
}

/// A project reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProject {
    /// Project key, e.g. `EN`.
    pub key: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Any `{ "name": ... }` reference (issue type, resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNamed {
    /// Display name.
    pub name: String,
}

/// A user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    /// Account identifier.
    #[serde(default)]
    pub account_id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A workflow status reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatus {
    /// Status name, e.g. `In Progress`.
    pub name: String,

    /// Status category, e.g. `Done`.
    #[serde(default)]
    pub status_category: Option<RawNamed>,
}

/// The expanded changelog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChangelog {
    /// History batches, in whatever order the service returned them.
    #[serde(default)]
    pub histories: Vec<RawHistory>,
}

/// One batch of field changes made together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHistory {
    /// When the batch was recorded.
    pub created: String,

    /// Individual field changes.
    #[serde(default)]
    pub items: Vec<RawChangeItem>,
}

/// One field change inside a history batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChangeItem {
    /// Field name, `status` for workflow transitions.
    pub field: String,

    /// Field type, `jira` for built-in fields.
    #[serde(default)]
    pub fieldtype: Option<String>,

    /// Previous value id.
    #[serde(default)]
    pub from: Option<String>,

    /// Previous value display text.
    #[serde(default, rename = "fromString")]
    pub from_name: Option<String>,

    /// New value id.
    #[serde(default)]
    pub to: Option<String>,

    /// New value display text.
    #[serde(default, rename = "toString")]
    pub to_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_service_shape() {
        let raw: RawIssue = serde_json::from_value(json!({
            "key": "EN-7",
            "fields": {
                "project": { "key": "EN", "name": "Engineering" },
                "issuetype": { "name": "Story" },
                "assignee": { "accountId": "a1", "displayName": "Sam Lee" },
                "status": { "name": "Done", "statusCategory": { "name": "Done" } },
                "summary": "Rotate keys",
                "created": "2021-03-30T09:00:00.000+0000",
                "resolutiondate": null,
                "customfield_10002": "5",
                "customfield_10100": null
            },
            "changelog": {
                "histories": [{
                    "created": "2021-04-01T10:00:00.000+0000",
                    "items": [{
                        "field": "status",
                        "fieldtype": "jira",
                        "from": "1",
                        "fromString": "Open",
                        "to": "3",
                        "toString": "Prioritized"
                    }]
                }]
            }
        }))
        .unwrap();

        assert_eq!(raw.key, "EN-7");
        assert_eq!(raw.fields.project.as_ref().map(|p| p.key.as_str()), Some("EN"));
        assert_eq!(
            raw.fields
                .assignee
                .as_ref()
                .and_then(|a| a.display_name.as_deref()),
            Some("Sam Lee")
        );
        assert!(raw.fields.resolutiondate.is_none());
        assert_eq!(raw.fields.get("customfield_10002"), Some(&json!("5")));
        assert_eq!(raw.fields.get("customfield_10100"), None);
        assert_eq!(raw.fields.get("customfield_99999"), None);

        let item = &raw.changelog.histories[0].items[0];
        assert_eq!(item.from_name.as_deref(), Some("Open"));
        assert_eq!(item.to_name.as_deref(), Some("Prioritized"));
    }

    #[test]
    fn changelog_is_optional() {
        let raw: RawIssue = serde_json::from_value(json!({
            "key": "EN-8",
            "fields": { "created": "2021-03-30" }
        }))
        .unwrap();

        assert!(raw.changelog.histories.is_empty());
        assert!(raw.fields.project.is_none());
    }
}
