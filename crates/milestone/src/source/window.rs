//! Week-sized search windows.
//!
//! The service caps how many results one search returns, so retrieval walks
//! the date range a week at a time and checks each page against the cap.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;

/// An inclusive range of calendar days, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchWindow {
    /// First day in the window.
    pub start: NaiveDate,
    /// Last day in the window.
    pub end: NaiveDate,
}

impl SearchWindow {
    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Split `start..=end` into Monday..Sunday windows.
///
/// The first window begins on the Monday of `start`'s week, so it may reach
/// back before `start`; the last window is the week containing `end`. An
/// `end` before that first Monday yields no windows.
pub fn weekly_windows(start: NaiveDate, end: NaiveDate) -> Vec<SearchWindow> {
    let offset = u64::from(start.weekday().num_days_from_monday());
    let mut windows = Vec::new();
    let Some(mut monday) = start.checked_sub_days(Days::new(offset)) else {
        return windows;
    };

    while monday <= end {
        let Some(sunday) = monday.checked_add_days(Days::new(6)) else {
            break;
        };
        windows.push(SearchWindow {
            start: monday,
            end: sunday,
        });
        match monday.checked_add_days(Days::new(7)) {
            Some(next) => monday = next,
            None => break,
        }
    }

    windows
}

/// One search against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Project key.
    pub project: String,
    /// Creation-date window.
    pub window: SearchWindow,
    /// Only issues in the Done category with a Done resolution.
    pub done_only: bool,
}

impl SearchQuery {
    /// Render the query in the service's query language, on one line.
    pub fn jql(&self) -> String {
        let mut clauses = vec![
            format!("PROJECT = {}", self.project),
            format!("created >= {}", self.window.start),
            format!("created <= {}", self.window.end),
        ];
        if self.done_only {
            clauses.push("statusCategory = Done".to_string());
            clauses.push("resolution = Done".to_string());
        }
        clauses.join(" AND ")
    }
}
