//! Workflow transitions extracted from an issue's changelog.
//!
//! A [`TransitionEvent`] is one change of the `status` field. A
//! [`TransitionHistory`] holds every such change for one issue and answers
//! "when did this issue first/last enter state X" against a time-sorted view.

use super::raw::{RawChangeItem, RawChangelog};
use crate::error::ParseError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::fmt;

/// Name of the changelog field that records workflow transitions.
pub const STATUS_FIELD: &str = "status";

/// Offset-bearing formats the service emits besides strict RFC 3339,
/// e.g. `2021-04-01T10:15:30.000+0000`. `%.f` also matches no fraction.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a service timestamp into an offset-aware date-time.
///
/// Accepts RFC 3339, the service's `+0000` offset style (with or without
/// fractional seconds), offset-less date-times (UTC) and bare dates
/// (midnight UTC).
///
/// # Errors
///
/// Returns [`ParseError`] when none of the accepted forms match.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let trimmed = input.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts);
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| ParseError::new(input))
}

/// One normalized workflow-field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Changed field, `status` for everything in a [`TransitionHistory`].
    pub field: String,

    /// Field type as reported by the service.
    pub field_type: Option<String>,

    /// Identifier of the state being left.
    pub from_state_id: Option<String>,

    /// Identifier of the state being entered.
    pub to_state_id: Option<String>,

    /// Name of the state being left.
    pub from_state: Option<String>,

    /// Name of the state being entered.
    pub to_state: Option<String>,

    /// When the change was recorded.
    pub timestamp: DateTime<FixedOffset>,
}

impl TransitionEvent {
    /// Build an event from a history batch timestamp and one of its items.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `timestamp` is not a recognizable date-time.
    pub fn from_change(timestamp: &str, change: &RawChangeItem) -> Result<Self, ParseError> {
        Ok(Self {
            field: change.field.clone(),
            field_type: change.fieldtype.clone(),
            from_state_id: change.from.clone(),
            to_state_id: change.to.clone(),
            from_state: change.from_name.clone(),
            to_state: change.to_name.clone(),
            timestamp: parse_timestamp(timestamp)?,
        })
    }

    /// Calendar date of the transition, in the timestamp's own offset.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Whether this event moves the issue into `state`.
    pub fn is_transition_to(&self, state: &str) -> bool {
        self.to_state.as_deref() == Some(state)
    }
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "[{}] '{}'({}) -> '{}'({})",
            self.date(),
            show(&self.from_state),
            show(&self.from_state_id),
            show(&self.to_state),
            show(&self.to_state_id),
        )
    }
}

/// All status transitions of one issue.
///
/// Events are kept in the order they were given. Call
/// [`sorted_by_time`](Self::sorted_by_time) before asking first/last
/// questions; the lookups scan whatever order the history holds.
/// Duplicate transitions into the same state are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionHistory {
    events: Vec<TransitionEvent>,
}

impl TransitionHistory {
    /// Wrap an existing list of events, preserving its order.
    pub fn new(events: Vec<TransitionEvent>) -> Self {
        Self { events }
    }

    /// Extract status transitions from a changelog.
    ///
    /// Only items whose field is exactly `status` are kept. Several status
    /// items in one batch become separate events sharing the batch timestamp.
    /// Batches without status items are not parsed at all.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if a batch holding a status change has an
    /// unparseable timestamp.
    pub fn events_for(changelog: &RawChangelog) -> Result<Self, ParseError> {
        let mut events = Vec::new();
        for history in &changelog.histories {
            for item in history.items.iter().filter(|i| i.field == STATUS_FIELD) {
                events.push(TransitionEvent::from_change(&history.created, item)?);
            }
        }
        Ok(Self { events })
    }

    /// A copy ordered ascending by timestamp. The sort is stable, so events
    /// with equal timestamps keep their encounter order.
    #[must_use]
    pub fn sorted_by_time(&self) -> Self {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.timestamp);
        Self { events }
    }

    /// Date of the first event, in stored order, that satisfies `predicate`.
    pub fn first_match<P>(&self, mut predicate: P) -> Option<NaiveDate>
    where
        P: FnMut(&TransitionEvent) -> bool,
    {
        self.events
            .iter()
            .find(|e| predicate(e))
            .map(TransitionEvent::date)
    }

    /// Date of the last event, in stored order, that satisfies `predicate`.
    pub fn last_match<P>(&self, mut predicate: P) -> Option<NaiveDate>
    where
        P: FnMut(&TransitionEvent) -> bool,
    {
        self.events
            .iter()
            .rev()
            .find(|e| predicate(e))
            .map(TransitionEvent::date)
    }

    /// Like [`first_match`](Self::first_match), returning `default` when
    /// nothing matches.
    pub fn first_match_or<P>(&self, predicate: P, default: Option<NaiveDate>) -> Option<NaiveDate>
    where
        P: FnMut(&TransitionEvent) -> bool,
    {
        self.first_match(predicate).or(default)
    }

    /// Like [`last_match`](Self::last_match), returning `default` when
    /// nothing matches.
    pub fn last_match_or<P>(&self, predicate: P, default: Option<NaiveDate>) -> Option<NaiveDate>
    where
        P: FnMut(&TransitionEvent) -> bool,
    {
        self.last_match(predicate).or(default)
    }

    /// Date of the first transition into `state`.
    pub fn first_to(&self, state: &str) -> Option<NaiveDate> {
        self.first_match(|e| e.is_transition_to(state))
    }

    /// Date of the last transition into `state`.
    pub fn last_to(&self, state: &str) -> Option<NaiveDate> {
        self.last_match(|e| e.is_transition_to(state))
    }

    /// Iterate over events in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, TransitionEvent> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the issue has no recorded transitions.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<TransitionEvent> for TransitionHistory {
    fn from_iter<I: IntoIterator<Item = TransitionEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TransitionHistory {
    type Item = &'a TransitionEvent;
    type IntoIter = std::slice::Iter<'a, TransitionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
