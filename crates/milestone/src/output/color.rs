//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Done:      green   (finished statuses, resolution dates)
//!   - Active:    yellow  (statuses still in flight, warnings)
//!   - Reference: cyan    (issue keys, transition arrows)
//!   - Muted:     dimmed  (field labels, absent dates)
//!   - Emphasis:  bold    (section headers)

use super::OutputConfig;
use chrono::NaiveDate;
use colored::Colorize;

/// Placeholder shown for a value that is not set.
pub const ABSENT: &str = "-";

const DONE_STATUSES: [&str; 3] = ["Done", "Closed", "Resolved"];

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize an issue key (cyan).
pub(crate) fn colorize_key(key: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return key.to_string();
    }
    key.cyan().to_string()
}

/// Color a status name: green once finished, yellow otherwise.
pub(crate) fn colorize_status(status: Option<&str>, config: &OutputConfig) -> String {
    let Some(status) = status else {
        return dimmed(ABSENT, config);
    };
    if !config.use_colors {
        return status.to_string();
    }
    if DONE_STATUSES.contains(&status) {
        status.green().to_string()
    } else {
        status.yellow().to_string()
    }
}

/// Render an optional date, dimming the placeholder.
pub(crate) fn colorize_date(date: Option<NaiveDate>, config: &OutputConfig) -> String {
    match date {
        Some(date) => date.to_string(),
        None => dimmed(ABSENT, config),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply cyan color to text (for arrows/connectors).
pub(crate) fn cyan(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    // colored's set_override() is process-global
    static COLOR_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = COLOR_MUTEX.lock().unwrap();
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false)
    }

    #[test]
    fn plain_config_leaves_text_alone() {
        let config = plain();
        assert_eq!(colorize_key("EN-1", &config), "EN-1");
        assert_eq!(colorize_status(Some("Done"), &config), "Done");
        assert_eq!(colorize_status(None, &config), "-");
        assert_eq!(colorize_date(None, &config), "-");
        assert_eq!(
            colorize_date(NaiveDate::from_ymd_opt(2021, 4, 1), &config),
            "2021-04-01"
        );
        assert_eq!(warning("careful", &config), "careful");
    }

    #[test]
    fn colored_config_adds_escape_codes() {
        let _guard = ColorGuard::new();
        let config = OutputConfig::new(80, true);

        let key = colorize_key("EN-1", &config);
        assert!(key.contains("\x1b["), "Expected ANSI codes in {key:?}");
        assert!(key.contains("EN-1"));

        let done = colorize_status(Some("Done"), &config);
        let active = colorize_status(Some("In Progress"), &config);
        assert_ne!(done, "Done");
        assert_ne!(done, active.replace("In Progress", "Done"));
    }
}
