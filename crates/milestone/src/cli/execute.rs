//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use std::path::Path;
use tokio::fs;

use super::args::{InitArgs, LifecycleArgs, ListArgs, ShowArgs, WindowsArgs};
use crate::config::Config;
use crate::domain::IssueRecord;
use crate::error::Error;
use crate::output::{self, OutputConfig, OutputMode};
use crate::source::{ExportSource, build_records, plan_queries, retrieve_issues};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Tell a text-mode user about skipped input; JSON output stays clean and
/// the details are in the log.
fn report_skipped(what: &str, count: usize, output_mode: OutputMode) {
    if count == 0 || output_mode == OutputMode::Json {
        return;
    }
    let message = format!("Skipped {count} {what} (see log for details)");
    eprintln!("{}", output::warning(&message, &OutputConfig::from_env()));
}

async fn load_export(path: &Path, output_mode: OutputMode) -> Result<ExportSource> {
    let source = ExportSource::load(path)
        .await
        .with_context(|| format!("Failed to read export {}", path.display()))?;
    report_skipped("export entries", source.warnings().len(), output_mode);
    Ok(source)
}

async fn retrieve_records(
    config: &Config,
    source: &ExportSource,
    until: NaiveDate,
    output_mode: OutputMode,
) -> Result<Vec<IssueRecord>> {
    let raws = retrieve_issues(source, &config.query, until).await?;
    let (records, warnings) = build_records(&raws, &config.custom_fields);
    report_skipped("issues", warnings.len(), output_mode);
    Ok(records)
}

fn record_by_key(config: &Config, source: &ExportSource, key: &str) -> Result<IssueRecord> {
    let raw = source
        .find(key)
        .ok_or_else(|| Error::IssueNotFound(key.to_string()))?;
    let record = IssueRecord::from_raw(raw, &config.custom_fields)
        .with_context(|| format!("Failed to read issue {key}"))?;
    Ok(record)
}

/// Execute the init command
pub async fn execute_init(
    config_path: &Path,
    args: &InitArgs,
    output_mode: OutputMode,
) -> Result<()> {
    if !args.force && fs::try_exists(config_path).await? {
        bail!(
            "Configuration file {} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::starter();
    config
        .save(config_path)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "config_file": config_path.display().to_string(),
                "custom_fields": config.custom_fields.len(),
            }))?;
        }
        OutputMode::Text if !args.quiet => {
            println!("Wrote configuration to {}", config_path.display());
            println!("  Edit the custom field ids to match your issue tracker.");
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the windows command
pub fn execute_windows(config: &Config, args: &WindowsArgs, output_mode: OutputMode) -> Result<()> {
    let until = args.until.unwrap_or_else(today);
    let queries = plan_queries(&config.query, until);
    output::print_queries(&queries, output_mode)?;
    Ok(())
}

/// Execute the list command
pub async fn execute_list(config: &Config, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let source = load_export(&args.export, output_mode).await?;
    let until = args.until.unwrap_or_else(today);
    let records = retrieve_records(config, &source, until, output_mode).await?;
    output::print_issues(&records, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(config: &Config, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let source = load_export(&args.export, output_mode).await?;
    let record = record_by_key(config, &source, &args.key)?;
    output::print_issue_details(&record, output_mode)?;
    Ok(())
}

/// Execute the lifecycle command
pub async fn execute_lifecycle(
    config: &Config,
    args: &LifecycleArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let source = load_export(&args.export, output_mode).await?;

    let records = match &args.key {
        Some(key) => vec![record_by_key(config, &source, key)?],
        None => {
            let until = args.until.unwrap_or_else(today);
            retrieve_records(config, &source, until, output_mode).await?
        }
    };

    output::print_lifecycles(&records, output_mode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn export_file(lines: &[serde_json::Value]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn issue(key: &str, created: &str) -> serde_json::Value {
        json!({
            "key": key,
            "fields": {
                "project": { "key": "EN" },
                "status": { "name": "Done", "statusCategory": { "name": "Done" } },
                "resolution": { "name": "Done" },
                "created": created,
                "resolutiondate": "2021-04-20T10:00:00.000+0000"
            }
        })
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("milestone.yaml");
        let args = InitArgs {
            force: false,
            quiet: true,
        };

        execute_init(&path, &args, OutputMode::Text).await.unwrap();
        assert_eq!(Config::load(&path).await.unwrap(), Config::starter());

        let err = execute_init(&path, &args, OutputMode::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let forced = InitArgs {
            force: true,
            quiet: true,
        };
        execute_init(&path, &forced, OutputMode::Text).await.unwrap();
    }

    #[tokio::test]
    async fn show_unknown_key_is_not_found() {
        let file = export_file(&[issue("EN-1", "2021-03-02T10:00:00.000+0000")]);
        let args = ShowArgs {
            key: "EN-404".to_string(),
            export: file.path().to_path_buf(),
        };

        let err = execute_show(&Config::default(), &args, OutputMode::Json)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IssueNotFound(key)) if key == "EN-404"
        ));
    }

    #[tokio::test]
    async fn record_by_key_reads_one_issue() {
        let file = export_file(&[
            issue("EN-1", "2021-03-02T10:00:00.000+0000"),
            issue("EN-2", "2021-03-03T10:00:00.000+0000"),
        ]);
        let source = ExportSource::load(file.path()).await.unwrap();

        let record = record_by_key(&Config::default(), &source, "EN-2").unwrap();
        assert_eq!(record.key, "EN-2");
        assert_eq!(
            record.lifecycle().in_staging(),
            NaiveDate::from_ymd_opt(2021, 4, 20)
        );
    }

    #[tokio::test]
    async fn retrieve_records_stops_at_until() {
        let file = export_file(&[
            issue("EN-1", "2021-03-02T10:00:00.000+0000"),
            issue("EN-2", "2021-03-20T10:00:00.000+0000"),
        ]);
        let source = ExportSource::load(file.path()).await.unwrap();
        let until = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();

        let records = retrieve_records(&Config::default(), &source, until, OutputMode::Json)
            .await
            .unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["EN-1"]);
    }

    #[tokio::test]
    async fn missing_export_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let args = ListArgs {
            export: temp_dir.path().join("absent.jsonl"),
            until: None,
        };

        let err = execute_list(&Config::default(), &args, OutputMode::Json)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read export"));
    }
}
