//! Lifecycle milestone resolution.
//!
//! Workflow state names changed across process revisions: older issues went
//! through "Dev Review", newer ones through "Security Review" and
//! "In Staging". Each milestone therefore looks for its preferred state and
//! falls back through the historical aliases before settling on a default
//! taken from another milestone. `dev_review` and `security_review` are the
//! same gate under two names and agree whenever only one of them appears.
//!
//! | Milestone | First choice | Fallbacks |
//! |---|---|---|
//! | created | creation date | |
//! | prioritized | first "Prioritized" | created |
//! | dev_ready | first "Dev Ready" | in_progress |
//! | in_progress | first "In Progress" | dev_review |
//! | dev_review | first "Dev Review" | first "Security Review", first "In Staging", resolution |
//! | security_review | first "Security Review" | first "Dev Review", first "In Staging", resolution |
//! | in_staging | last "In Staging" | resolution |
//! | resolution | resolution date | |

use super::transition::TransitionHistory;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Workflow state names the resolver looks for.
pub mod states {
    /// Triaged and accepted into the backlog.
    pub const PRIORITIZED: &str = "Prioritized";
    /// Specified and ready to be picked up.
    pub const DEV_READY: &str = "Dev Ready";
    /// Being worked on.
    pub const IN_PROGRESS: &str = "In Progress";
    /// Code review, original process.
    pub const DEV_REVIEW: &str = "Dev Review";
    /// Code review, later process.
    pub const SECURITY_REVIEW: &str = "Security Review";
    /// Deployed to staging.
    pub const IN_STAGING: &str = "In Staging";
}

/// The eight lifecycle milestones, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// Issue creation.
    Created,
    /// First prioritization.
    Prioritized,
    /// Ready for development.
    DevReady,
    /// Development started.
    InProgress,
    /// Entered review (original name).
    DevReview,
    /// Entered review (later name).
    SecurityReview,
    /// Most recent arrival in staging.
    InStaging,
    /// Issue resolution.
    Resolution,
}

impl Milestone {
    /// All milestones in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Created,
        Self::Prioritized,
        Self::DevReady,
        Self::InProgress,
        Self::DevReview,
        Self::SecurityReview,
        Self::InStaging,
        Self::Resolution,
    ];

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Prioritized => "Prioritized",
            Self::DevReady => "Dev Ready",
            Self::InProgress => "In Progress",
            Self::DevReview => "Dev Review",
            Self::SecurityReview => "Security Review",
            Self::InStaging => "In Staging",
            Self::Resolution => "Resolved",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved milestone dates for one issue.
///
/// Every milestone is either a date or absent. Absence propagates through the
/// fallback chain and bottoms out at `resolution` (absent while unresolved)
/// or `created`. Input ordering is trusted: nothing checks that milestones
/// fall after `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
    created: NaiveDate,
    prioritized: Option<NaiveDate>,
    dev_ready: Option<NaiveDate>,
    in_progress: Option<NaiveDate>,
    dev_review: Option<NaiveDate>,
    security_review: Option<NaiveDate>,
    in_staging: Option<NaiveDate>,
    resolution: Option<NaiveDate>,
}

impl Lifecycle {
    /// Resolve every milestone from an issue's dates and transitions.
    ///
    /// The history is sorted by time once, here; it may be passed in any
    /// order. Milestones whose default is another milestone are resolved
    /// after that milestone.
    pub fn resolve(
        created: NaiveDate,
        resolution: Option<NaiveDate>,
        history: &TransitionHistory,
    ) -> Self {
        let sorted = history.sorted_by_time();

        let dev_review = first_of(
            &sorted,
            &[states::DEV_REVIEW, states::SECURITY_REVIEW, states::IN_STAGING],
        )
        .or(resolution);
        let security_review = first_of(
            &sorted,
            &[states::SECURITY_REVIEW, states::DEV_REVIEW, states::IN_STAGING],
        )
        .or(resolution);
        let in_staging =
            sorted.last_match_or(|e| e.is_transition_to(states::IN_STAGING), resolution);
        let in_progress = sorted.first_to(states::IN_PROGRESS).or(dev_review);
        let dev_ready = sorted.first_to(states::DEV_READY).or(in_progress);
        let prioritized =
            sorted.first_match_or(|e| e.is_transition_to(states::PRIORITIZED), Some(created));

        Self {
            created,
            prioritized,
            dev_ready,
            in_progress,
            dev_review,
            security_review,
            in_staging,
            resolution,
        }
    }

    /// Date of a milestone by name.
    pub fn get(&self, milestone: Milestone) -> Option<NaiveDate> {
        match milestone {
            Milestone::Created => Some(self.created),
            Milestone::Prioritized => self.prioritized,
            Milestone::DevReady => self.dev_ready,
            Milestone::InProgress => self.in_progress,
            Milestone::DevReview => self.dev_review,
            Milestone::SecurityReview => self.security_review,
            Milestone::InStaging => self.in_staging,
            Milestone::Resolution => self.resolution,
        }
    }

    /// All milestones with their dates, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Milestone, Option<NaiveDate>)> + '_ {
        Milestone::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    /// Creation date.
    pub fn created(&self) -> NaiveDate {
        self.created
    }

    /// First transition into "Prioritized", else `created`.
    pub fn prioritized(&self) -> Option<NaiveDate> {
        self.prioritized
    }

    /// First transition into "Dev Ready", else `in_progress`.
    pub fn dev_ready(&self) -> Option<NaiveDate> {
        self.dev_ready
    }

    /// First transition into "In Progress", else `dev_review`.
    pub fn in_progress(&self) -> Option<NaiveDate> {
        self.in_progress
    }

    /// First review-like transition, preferring "Dev Review".
    pub fn dev_review(&self) -> Option<NaiveDate> {
        self.dev_review
    }

    /// First review-like transition, preferring "Security Review".
    pub fn security_review(&self) -> Option<NaiveDate> {
        self.security_review
    }

    /// Last transition into "In Staging", else `resolution`.
    pub fn in_staging(&self) -> Option<NaiveDate> {
        self.in_staging
    }

    /// Resolution date.
    pub fn resolution(&self) -> Option<NaiveDate> {
        self.resolution
    }
}

/// First transition into the first alias that appears at all.
fn first_of(sorted: &TransitionHistory, aliases: &[&str]) -> Option<NaiveDate> {
    aliases.iter().find_map(|state| sorted.first_to(state))
}

/// Width of the label column: the longest label plus its colon and a space.
pub const LABEL_WIDTH: usize = "Security Review: ".len();

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (milestone, date)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let label = format!("{}:", milestone.label());
            match date {
                Some(date) => write!(f, "{label:<LABEL_WIDTH$}{date}")?,
                None => write!(f, "{label:<LABEL_WIDTH$}-")?,
            }
        }
        Ok(())
    }
}
