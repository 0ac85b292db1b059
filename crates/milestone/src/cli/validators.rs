//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use chrono::NaiveDate;

/// Validate an issue key such as `EN-123`.
///
/// The project part is letters, digits and underscores starting with a
/// letter; the number part is digits. Keys are upper-cased.
pub fn validate_issue_key(s: &str) -> Result<String, String> {
    let key = s.trim().to_ascii_uppercase();

    if key.is_empty() {
        return Err("Issue key cannot be empty".to_string());
    }

    let Some((project, number)) = key.rsplit_once('-') else {
        return Err(format!(
            "Invalid issue key: '{}'. Expected PROJECT-NUMBER (e.g., EN-123)",
            s.trim()
        ));
    };

    if !project.starts_with(|c: char| c.is_ascii_alphabetic())
        || !project
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(format!(
            "Invalid project in issue key: '{project}'. Must start with a letter and contain only letters, digits and underscores"
        ));
    }

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Invalid number in issue key: '{number}'. Must be digits only"
        ));
    }

    Ok(key)
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {e}. Expected YYYY-MM-DD", s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("EN-123", "EN-123")]
    #[case::lowercase("en-7", "EN-7")]
    #[case::padded("  OPS2-40 ", "OPS2-40")]
    #[case::underscore("MY_PROJ-1", "MY_PROJ-1")]
    fn valid_issue_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_issue_key(input), Ok(expected.to_string()));
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::no_dash("EN123", "Expected PROJECT-NUMBER")]
    #[case::digit_project("1EN-5", "Invalid project")]
    #[case::no_number("EN-", "Invalid number")]
    #[case::letters_in_number("EN-12a", "Invalid number")]
    #[case::bad_project_char("E.N-5", "Invalid project")]
    fn invalid_issue_keys(#[case] input: &str, #[case] expected: &str) {
        let err = validate_issue_key(input).unwrap_err();
        assert!(
            err.contains(expected),
            "Expected error to contain '{}', got: '{}'",
            expected,
            err
        );
    }

    #[test]
    fn dates() {
        assert_eq!(
            parse_date("2021-03-01"),
            Ok(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap())
        );
        assert!(parse_date("03/01/2021").unwrap_err().contains("YYYY-MM-DD"));
        assert!(parse_date("2021-02-30").is_err());
    }
}
