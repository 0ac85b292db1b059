//! Output formatting for CLI commands.
//!
//! Every command can print human-readable text or JSON for programmatic use.
//! The text printers take any [`Write`] so they can be tested against a
//! buffer; the public functions lock stdout and pick a format.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - `json`: JSON views of records

pub mod color;
mod json;

use crate::domain::IssueRecord;
use crate::domain::lifecycle::LABEL_WIDTH;
use crate::source::SearchQuery;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::warning;

use color::{bold, colorize_date, colorize_key, colorize_status, cyan, dimmed};
use json::{
    print_issue_details_json, print_issues_json, print_lifecycles_json, print_queries_json,
    print_value_json,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_colors: bool) -> Self {
        Self {
            max_width,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `MILESTONE_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `MILESTONE_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_width = match lookup("MILESTONE_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) if width > 0 => width,
                _ => {
                    tracing::warn!(
                        env_var = "MILESTONE_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("MILESTONE_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size().map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| {
        usize::from(w.0)
    })
}

fn content_width(config: &OutputConfig) -> usize {
    get_terminal_width().min(config.max_width)
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a list of issues in the specified format
pub fn print_issues(records: &[IssueRecord], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_issues_text(&mut handle, records, content_width(&config), &config),
        OutputMode::Json => print_issues_json(&mut handle, records),
    }
}

/// Print one issue with its transitions and lifecycle (for show command)
pub fn print_issue_details(record: &IssueRecord, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => {
            print_issue_details_text(&mut handle, record, content_width(&config), &config)
        }
        OutputMode::Json => print_issue_details_json(&mut handle, record),
    }
}

/// Print the lifecycle of each issue
pub fn print_lifecycles(records: &[IssueRecord], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_lifecycles_text(&mut handle, records, &config),
        OutputMode::Json => print_lifecycles_json(&mut handle, records),
    }
}

/// Print planned search queries
pub fn print_queries(queries: &[SearchQuery], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_queries_text(&mut handle, queries, &config),
        OutputMode::Json => print_queries_json(&mut handle, queries),
    }
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    print_value_json(&mut handle, value)
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_issues_text<W: Write>(
    w: &mut W,
    records: &[IssueRecord],
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(w, "No issues found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} issue(s):", records.len())?;

    for record in records {
        writeln!(w)?;
        writeln!(
            w,
            "{}  {}  {}",
            colorize_key(&record.key, config),
            colorize_status(record.status.as_deref(), config),
            record.issue_type.as_deref().unwrap_or(color::ABSENT)
        )?;
        for line in wrap_text(&record.summary, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }

        let points = record
            .story_points()
            .map_or_else(|| color::ABSENT.to_string(), |p| p.to_string());
        writeln!(
            w,
            "  {} {}  {} {}  {} {}",
            dimmed("Team:", config),
            record.team().unwrap_or(color::ABSENT),
            dimmed("Category:", config),
            record.category().unwrap_or(color::ABSENT),
            dimmed("Points:", config),
            points
        )?;
    }

    Ok(())
}

fn print_issue_details_text<W: Write>(
    w: &mut W,
    record: &IssueRecord,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}: {}", colorize_key(&record.key, config), record.summary)?;

    writeln!(
        w,
        "{}  {}    {}  {}    {}  {}",
        dimmed("Type:", config),
        record.issue_type.as_deref().unwrap_or(color::ABSENT),
        dimmed("Status:", config),
        colorize_status(record.status.as_deref(), config),
        dimmed("Project:", config),
        record.project.as_deref().unwrap_or(color::ABSENT)
    )?;

    if let Some(ref assignee) = record.assignee {
        writeln!(w, "{} {}", dimmed("Assignee:", config), assignee)?;
    }

    let resolved = record.resolved.map_or_else(
        || dimmed(color::ABSENT, config),
        |ts| ts.format("%Y-%m-%d %H:%M").to_string(),
    );
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        record.created.format("%Y-%m-%d %H:%M"),
        dimmed("Resolved:", config),
        resolved
    )?;

    if !record.custom_fields().is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Custom Fields", config))?;
        for (name, value) in record.custom_fields() {
            let text = format!("{name}: {value}");
            for line in wrap_text(&text, width.saturating_sub(2)) {
                writeln!(w, "  {line}")?;
            }
        }
    }

    let transitions = record.state_transitions().sorted_by_time();
    if !transitions.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{} ({}):",
            bold("Transitions", config),
            transitions.len()
        )?;
        for event in &transitions {
            writeln!(w, "  {} {}", cyan("→", config), event)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}:", bold("Lifecycle", config))?;
    print_lifecycle_lines(w, record, config)
}

fn print_lifecycles_text<W: Write>(
    w: &mut W,
    records: &[IssueRecord],
    config: &OutputConfig,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(w, "No issues found.")?;
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "{}", colorize_key(&record.key, config))?;
        print_lifecycle_lines(w, record, config)?;
    }

    Ok(())
}

fn print_lifecycle_lines<W: Write>(
    w: &mut W,
    record: &IssueRecord,
    config: &OutputConfig,
) -> io::Result<()> {
    for (milestone, date) in record.lifecycle().iter() {
        let label = format!("{}:", milestone.label());
        writeln!(
            w,
            "  {}{}",
            dimmed(&format!("{label:<LABEL_WIDTH$}"), config),
            colorize_date(date, config)
        )?;
    }
    Ok(())
}

fn print_queries_text<W: Write>(
    w: &mut W,
    queries: &[SearchQuery],
    config: &OutputConfig,
) -> io::Result<()> {
    if queries.is_empty() {
        writeln!(w, "No search windows planned.")?;
        return Ok(());
    }

    writeln!(w, "Planned {} search queries:", queries.len())?;
    for query in queries {
        writeln!(
            w,
            "  {}  {}",
            bold(&query.window.to_string(), config),
            query.jql()
        )?;
    }
    Ok(())
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width.max(1))
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}
