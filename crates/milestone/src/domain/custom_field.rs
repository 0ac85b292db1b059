//! Configured custom fields and the mappers that type their raw values.
//!
//! The service addresses custom fields as `customfield_<id>`. Which ones
//! matter is configuration: each [`CustomField`] names a field id, a display
//! name and, optionally, the internal name and mapper to use. Fields that are
//! not configured are never read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Team placeholder for issues without a team.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// Category placeholder for issues without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Internal name of the story points field.
pub const STORY_POINTS: &str = "story_points";

/// Internal name of the team field.
pub const TEAM_ASSIGNED: &str = "team_assigned";

/// Internal name of the work category field.
pub const WORK_CATEGORY: &str = "work_category";

/// Mapper names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperKind {
    /// Integer or null.
    Integer,
    /// Option value, or a default text.
    Choice,
    /// Raw JSON, untouched.
    Identity,
}

/// A configured custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Numeric field id, the `<id>` in `customfield_<id>`.
    pub id: u64,

    /// Display name, e.g. `Story Points`.
    pub name: String,

    /// Internal name override. Defaults to the display name lower-cased with
    /// spaces turned into underscores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Mapper override. Defaults to the built-in mapper for the internal name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapper: Option<MapperKind>,

    /// Placeholder text for `choice` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl CustomField {
    /// Describe a field by id and display name, with derived internal name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            field_name: None,
            mapper: None,
            default: None,
        }
    }

    /// Override the internal name.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Key under which the raw value appears on an issue.
    pub fn field_key(&self) -> String {
        format!("customfield_{}", self.id)
    }

    /// Internal name the mapped value is exposed under.
    pub fn field_name(&self) -> String {
        self.field_name
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase().replace(' ', "_"))
    }

    /// The mapper applied to this field's raw value.
    pub fn mapper(&self) -> FieldMapper {
        let builtin = FieldMapper::for_field(&self.field_name());
        match self.mapper {
            None => match (builtin, &self.default) {
                (FieldMapper::Choice { .. }, Some(default)) => FieldMapper::Choice {
                    default: default.clone(),
                },
                (builtin, _) => builtin,
            },
            Some(MapperKind::Integer) => FieldMapper::Integer,
            Some(MapperKind::Identity) => FieldMapper::Identity,
            Some(MapperKind::Choice) => {
                let default = match (&self.default, builtin) {
                    (Some(default), _) => default.clone(),
                    (None, FieldMapper::Choice { default }) => default,
                    (None, _) => String::new(),
                };
                FieldMapper::Choice { default }
            }
        }
    }
}

/// How a raw custom field value becomes a [`FieldValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMapper {
    /// Parse to an integer; anything unparseable is `None`.
    Integer,
    /// Take the option's `value`, or `default` when the field is empty.
    Choice {
        /// Text used when the field has no value.
        default: String,
    },
    /// Keep the raw JSON.
    Identity,
}

impl FieldMapper {
    /// Built-in mapper for an internal field name.
    pub fn for_field(field_name: &str) -> Self {
        match field_name {
            STORY_POINTS => Self::Integer,
            TEAM_ASSIGNED => Self::Choice {
                default: UNASSIGNED_TEAM.to_string(),
            },
            WORK_CATEGORY => Self::Choice {
                default: UNCATEGORIZED.to_string(),
            },
            _ => Self::Identity,
        }
    }

    /// Map a raw value. `None` and JSON null both mean "not set".
    pub fn apply(&self, raw: Option<&Value>) -> FieldValue {
        match self {
            Self::Integer => FieldValue::Number(parse_integer(raw)),
            Self::Choice { default } => FieldValue::Text(choice_text(raw, default)),
            Self::Identity => FieldValue::Raw(raw.cloned().unwrap_or(Value::Null)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_integer(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn choice_text(raw: Option<&Value>, default: &str) -> String {
    match raw {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::Object(option)) => match option.get("value") {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A typed custom field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer field; `None` when absent or unparseable.
    Number(Option<i64>),
    /// Text field with a placeholder default.
    Text(String),
    /// Unmapped JSON.
    Raw(Value),
}

impl FieldValue {
    /// The integer, if this is a set numeric field.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => *n,
            _ => None,
        }
    }

    /// The text, if this is a text field or a raw JSON string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Raw(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(Some(n)) => write!(f, "{n}"),
            Self::Number(None) | Self::Raw(Value::Null) => write!(f, "-"),
            Self::Text(s) | Self::Raw(Value::String(s)) => write!(f, "{s}"),
            Self::Raw(other) => write!(f, "{other}"),
        }
    }
}
