//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Write a starter configuration file
//! - `windows`: Print the planned weekly search queries
//! - `list`: Retrieve and list issues from an export
//! - `show`: Show one issue with its transitions and lifecycle
//! - `lifecycle`: Print milestone dates per issue
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Configuration file (default: `milestone.yaml`)
//!
//! # Example
//!
//! ```bash
//! milestone init
//! milestone windows --until 2021-06-30
//! milestone list --export issues.jsonl
//! milestone --json lifecycle --export issues.jsonl --key EN-123
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{InitArgs, LifecycleArgs, ListArgs, ShowArgs, WindowsArgs};
pub use validators::{parse_date, validate_issue_key};

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::output::OutputMode;

/// Milestone - workflow milestone dates from issue tracker exports
///
/// Reads issues exported as JSON Lines, replays their status changes and
/// reports when each one was prioritized, started, reviewed, staged and
/// resolved.
#[derive(Parser, Debug)]
#[command(name = "milestone")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a starter configuration file
    ///
    /// Lists the story points, team and work category custom fields with
    /// placeholder ids. Refuses to overwrite an existing file without
    /// `--force`.
    Init(InitArgs),

    /// Print the planned search queries
    ///
    /// One query per Monday..Sunday week from the configured start date up
    /// to the week containing `--until`.
    Windows(WindowsArgs),

    /// List issues retrieved from an export
    ///
    /// Runs every weekly query against the export and fails if any week
    /// reaches the configured page limit.
    List(ListArgs),

    /// Show detailed information about an issue
    ///
    /// Displays the issue's fields, configured custom fields, status
    /// transitions in time order and its lifecycle.
    Show(ShowArgs),

    /// Print lifecycle milestone dates
    ///
    /// For every retrieved issue, or a single issue with `--key`.
    Lifecycle(LifecycleArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown commands or invalid values.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command
    /// fails.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => {
                execute::execute_init(&self.config, args, output_mode).await
            }
            Some(Commands::Windows(args)) => {
                let config = Config::load_or_default(&self.config).await?;
                execute::execute_windows(&config, args, output_mode)
            }
            Some(Commands::List(args)) => {
                let config = Config::load_or_default(&self.config).await?;
                execute::execute_list(&config, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let config = Config::load_or_default(&self.config).await?;
                execute::execute_show(&config, args, output_mode).await
            }
            Some(Commands::Lifecycle(args)) => {
                let config = Config::load_or_default(&self.config).await?;
                execute::execute_lifecycle(&config, args, output_mode).await
            }
            None => {
                println!("Milestone lifecycle reporting");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["milestone"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert_eq!(cli.config, PathBuf::from("milestone.yaml"));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "milestone",
            "windows",
            "--json",
            "--config",
            "other.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("other.yaml"));
        assert!(matches!(cli.command, Some(Commands::Windows(_))));
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["milestone", "init", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert!(args.force);
                assert!(!args.quiet);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_parse_windows_until() {
        let cli = Cli::try_parse_from(["milestone", "windows", "--until", "2021-06-30"]).unwrap();
        match cli.command {
            Some(Commands::Windows(args)) => {
                assert_eq!(args.until, NaiveDate::from_ymd_opt(2021, 6, 30));
            }
            _ => panic!("Expected Windows command"),
        }
    }

    #[test]
    fn test_parse_windows_invalid_date() {
        let result = Cli::try_parse_from(["milestone", "windows", "--until", "June"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_requires_export() {
        assert!(Cli::try_parse_from(["milestone", "list"]).is_err());

        let cli = Cli::try_parse_from(["milestone", "list", "-e", "issues.jsonl"]).unwrap();
        match cli.command {
            Some(Commands::List(args)) => {
                assert_eq!(args.export, PathBuf::from("issues.jsonl"));
                assert!(args.until.is_none());
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_parse_show_normalizes_key() {
        let cli =
            Cli::try_parse_from(["milestone", "show", "en-12", "--export", "issues.jsonl"]).unwrap();
        match cli.command {
            Some(Commands::Show(args)) => assert_eq!(args.key, "EN-12"),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_show_invalid_key() {
        let result = Cli::try_parse_from(["milestone", "show", "bogus", "-e", "issues.jsonl"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_lifecycle_key_conflicts_with_until() {
        let cli = Cli::try_parse_from([
            "milestone",
            "lifecycle",
            "-e",
            "issues.jsonl",
            "--key",
            "EN-1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Lifecycle(args)) => assert_eq!(args.key.as_deref(), Some("EN-1")),
            _ => panic!("Expected Lifecycle command"),
        }

        let result = Cli::try_parse_from([
            "milestone",
            "lifecycle",
            "-e",
            "issues.jsonl",
            "--key",
            "EN-1",
            "--until",
            "2021-06-30",
        ]);
        assert!(result.is_err());
    }
}
