//! Integration tests for loading exports and retrieving issues.
//!
//! # Test Coverage
//!
//! - Resilient export loading through `milestone-jsonl`
//! - Week-by-week retrieval against an export
//! - Page limit detection
//! - Per-issue error isolation when building records

use chrono::NaiveDate;
use milestone::config::{Config, QueryConfig};
use milestone::error::Error;
use milestone::source::{
    ExportSource, IssueSource, LoadWarning, SearchQuery, SearchWindow, build_records,
    retrieve_issues,
};
use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_temp_jsonl_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn issue_json(key: &str, created: &str, done: bool) -> Value {
    let (category, resolution, resolved) = if done {
        (
            "Done",
            json!({ "name": "Done" }),
            json!("2021-04-30T12:00:00.000+0000"),
        )
    } else {
        ("In Progress", Value::Null, Value::Null)
    };
    json!({
        "key": key,
        "fields": {
            "project": { "key": "EN", "name": "Engineering" },
            "issuetype": { "name": "Story" },
            "status": { "name": "Closed", "statusCategory": { "name": category } },
            "resolution": resolution,
            "summary": format!("Issue {key}"),
            "created": created,
            "resolutiondate": resolved,
            "customfield_10002": 3,
            "customfield_10100": { "value": "Platform" }
        },
        "changelog": { "histories": [{
            "created": "2021-04-02T12:00:00.000+0000",
            "items": [{ "field": "status", "from": "1", "fromString": "Open",
                        "to": "2", "toString": "Prioritized" }]
        }]}
    })
}

fn export(issues: &[Value]) -> NamedTempFile {
    let content: String = issues.iter().map(|issue| format!("{issue}\n")).collect();
    create_temp_jsonl_file(&content)
}

fn query_config(page_limit: usize) -> QueryConfig {
    QueryConfig {
        start: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        page_limit,
        ..QueryConfig::default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn load_skips_malformed_lines() {
    let good = issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true);
    let content = format!("{good}\n{{\"key\": \"EN-2\", broken\n\n[1, 2]\n");
    let file = create_temp_jsonl_file(&content);

    let source = ExportSource::load(file.path()).await.unwrap();

    assert_eq!(source.len(), 1);
    let warnings = source.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(matches!(
        warnings[0],
        LoadWarning::MalformedJson { line_number: 2, .. }
    ));
    assert!(matches!(
        warnings[1],
        LoadWarning::MalformedJson { line_number: 4, .. }
    ));
}

#[tokio::test]
async fn load_rejects_json_array_export() {
    let issues = json!([issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true)]);
    let file = create_temp_jsonl_file(&issues.to_string());

    let err = ExportSource::load(file.path()).await.unwrap_err();
    assert!(matches!(err, Error::Export(_)), "got {err:?}");
}

#[tokio::test]
async fn load_missing_file_is_io_error() {
    let file = export(&[]);
    let path = file.path().with_extension("missing");

    let err = ExportSource::load(&path).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn load_empty_export() {
    let file = export(&[]);
    let source = ExportSource::load(file.path()).await.unwrap();

    assert!(source.is_empty());
    assert!(source.warnings().is_empty());
}

// =============================================================================
// Retrieval
// =============================================================================

#[tokio::test]
async fn retrieval_collects_done_issues_week_by_week() {
    let file = export(&[
        issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true),
        issue_json("EN-2", "2021-03-10T10:00:00.000+0000", true),
        issue_json("EN-3", "2021-03-11T10:00:00.000+0000", false),
        issue_json("EN-4", "2021-02-26T10:00:00.000+0000", true),
        issue_json("EN-5", "2021-04-01T10:00:00.000+0000", true),
    ]);
    let source = ExportSource::load(file.path()).await.unwrap();

    let raws = retrieve_issues(&source, &query_config(99), date(2021, 3, 21))
        .await
        .unwrap();

    let keys: Vec<_> = raws.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["EN-1", "EN-2"]);
}

#[tokio::test]
async fn retrieval_includes_unresolved_when_not_done_only() {
    let file = export(&[
        issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true),
        issue_json("EN-3", "2021-03-11T10:00:00.000+0000", false),
    ]);
    let source = ExportSource::load(file.path()).await.unwrap();
    let config = QueryConfig {
        done_only: false,
        ..query_config(99)
    };

    let raws = retrieve_issues(&source, &config, date(2021, 3, 21))
        .await
        .unwrap();
    assert_eq!(raws.len(), 2);
}

#[tokio::test]
async fn full_page_fails_retrieval() {
    let issues: Vec<Value> = (1..=3)
        .map(|n| issue_json(&format!("EN-{n}"), "2021-03-09T10:00:00.000+0000", true))
        .collect();
    let file = export(&issues);
    let source = ExportSource::load(file.path()).await.unwrap();

    let err = retrieve_issues(&source, &query_config(3), date(2021, 3, 31))
        .await
        .unwrap_err();

    match &err {
        Error::PaginationLimitExceeded {
            window,
            count,
            limit,
        } => {
            assert_eq!(
                *window,
                SearchWindow {
                    start: date(2021, 3, 8),
                    end: date(2021, 3, 14)
                }
            );
            assert_eq!((*count, *limit), (3, 3));
        }
        other => panic!("Expected PaginationLimitExceeded, got {other:?}"),
    }
    assert!(err.to_string().contains("2021-03-08..2021-03-14"));
}

#[tokio::test]
async fn export_source_answers_single_query() {
    let source = ExportSource::from_issues(vec![
        serde_json::from_value(issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true)).unwrap(),
    ]);
    let query = SearchQuery {
        project: "EN".to_string(),
        window: SearchWindow {
            start: date(2021, 3, 1),
            end: date(2021, 3, 7),
        },
        done_only: true,
    };

    let found = source.search(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].key, "EN-1");
}

// =============================================================================
// Record building
// =============================================================================

#[tokio::test]
async fn records_from_export_use_configured_fields() {
    let mut broken = issue_json("EN-2", "2021-03-03T10:00:00.000+0000", true);
    broken["changelog"]["histories"][0]["created"] = json!("whenever");
    let file = export(&[
        issue_json("EN-1", "2021-03-02T10:00:00.000+0000", true),
        broken,
    ]);
    let source = ExportSource::load(file.path()).await.unwrap();
    let config = Config::starter();

    let raws = retrieve_issues(&source, &config.query, date(2021, 3, 7))
        .await
        .unwrap();
    let (records, warnings) = build_records(&raws, &config.custom_fields);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.story_points(), Some(3));
    assert_eq!(record.team(), Some("Platform"));
    assert_eq!(record.category(), Some("Uncategorized"));
    assert_eq!(record.lifecycle().prioritized(), Some(date(2021, 4, 2)));

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "EN-2");
    assert_eq!(warnings[0].error.input, "whenever");
}
