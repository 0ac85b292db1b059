//! Domain types for issue lifecycle reporting.
//!
//! Leaves first: [`raw`] mirrors the service's issue JSON, [`transition`]
//! extracts status changes, [`custom_field`] types configured fields,
//! [`issue`] assembles an [`IssueRecord`] and [`lifecycle`] derives its
//! milestone dates.

pub mod custom_field;
pub mod issue;
pub mod lifecycle;
pub mod raw;
pub mod transition;

pub use custom_field::{CustomField, FieldMapper, FieldValue, MapperKind};
pub use issue::IssueRecord;
pub use lifecycle::{Lifecycle, Milestone};
pub use raw::{RawChangeItem, RawChangelog, RawHistory, RawIssue};
pub use transition::{TransitionEvent, TransitionHistory, parse_timestamp};
