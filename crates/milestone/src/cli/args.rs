//! CLI argument structs for all commands.

use super::validators::{parse_date, validate_issue_key};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `windows` command
#[derive(Parser, Debug, Clone)]
pub struct WindowsArgs {
    /// Last creation date to cover (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    pub until: Option<NaiveDate>,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// JSON Lines export to read issues from
    #[arg(short, long)]
    pub export: PathBuf,

    /// Last creation date to cover (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    pub until: Option<NaiveDate>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue key (e.g., EN-123)
    #[arg(value_parser = validate_issue_key)]
    pub key: String,

    /// JSON Lines export to read issues from
    #[arg(short, long)]
    pub export: PathBuf,
}

/// Arguments for the `lifecycle` command
#[derive(Parser, Debug, Clone)]
pub struct LifecycleArgs {
    /// JSON Lines export to read issues from
    #[arg(short, long)]
    pub export: PathBuf,

    /// Only this issue, bypassing search windows
    #[arg(short, long, value_parser = validate_issue_key)]
    pub key: Option<String>,

    /// Last creation date to cover (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date, conflicts_with = "key")]
    pub until: Option<NaiveDate>,
}
