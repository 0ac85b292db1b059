//! Milestone CLI binary.

use anyhow::Result;
use milestone::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the milestone CLI.
///
/// Uses tokio's `current_thread` runtime; the work is sequential file I/O.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=milestone=debug,milestone_jsonl=trace cargo run
    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("milestone=info,milestone_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting milestone CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Milestone CLI completed successfully");
    Ok(())
}
