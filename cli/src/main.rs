//! CLI for the JIRA to GitHub issue migrator.
//!
//! Reads a project export and replays its milestones, labels, issues and
//! cross-references into a GitHub repository.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use jira_migrator::{
    load_settings, FailurePolicy, InMemoryGateway, RunSummary, Runner, RunnerConfig, RunnerError,
    Settings, Stage,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// JIRA Migrator - Import a JIRA project export into GitHub issues.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the project export (JSON). Not needed for `--mode post-process`.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Owner of the destination repository.
    #[arg(long)]
    account: String,

    /// Name of the destination repository.
    #[arg(long)]
    repo: String,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", required_unless_present = "dry_run")]
    token: Option<String>,

    /// Stage to run.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Index of the first issue to import.
    #[arg(long, default_value_t = 0)]
    start_from: usize,

    /// Path to the import ledger.
    #[arg(long, default_value = "import-ledger.json")]
    ledger: PathBuf,

    /// Path to a settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep importing after an issue fails.
    #[arg(long)]
    continue_on_failure: bool,

    /// Maximum concurrent comment updates.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Run against a simulated repository instead of GitHub.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Milestones,
    Labels,
    Issues,
    PostProcess,
    All,
}

impl From<Mode> for Stage {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Milestones => Stage::Milestones,
            Mode::Labels => Stage::Labels,
            Mode::Issues => Stage::Issues,
            Mode::PostProcess => Stage::PostProcess,
            Mode::All => Stage::All,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    if let Err(e) = validate(&args) {
        e.exit();
    }

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.all_success() {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Log level filtering comes from the `RUST_LOG` env var (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Checks argument combinations clap cannot express.
fn validate(args: &Args) -> Result<(), clap::Error> {
    if Stage::from(args.mode).needs_export() && args.export.is_none() {
        return Err(Args::command().error(
            ErrorKind::MissingRequiredArgument,
            format!(
                "--export is required for --mode {}",
                Stage::from(args.mode)
            ),
        ));
    }
    Ok(())
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    let mut config = RunnerConfig::new(
        args.export.unwrap_or_default(),
        args.account,
        args.repo,
        args.token.unwrap_or_default(),
        args.mode.into(),
    )
    .with_settings(settings)
    .with_start_from(args.start_from)
    .with_ledger_path(args.ledger)
    .with_dry_run(args.dry_run);

    if args.continue_on_failure {
        config = config.with_failure_policy(FailurePolicy::Continue);
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }

    if config.dry_run() {
        info!("Dry run: using a simulated repository");
        return Runner::with_gateway(config, InMemoryGateway::new()).run().await;
    }

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!(
        "  Milestones: {} existing, {} created",
        summary.milestones_existing, summary.milestones_created
    );
    println!(
        "  Labels: {} existing, {} created",
        summary.labels_existing, summary.labels_created
    );
    println!("  Issues imported: {}", summary.issues_imported);
    println!(
        "  Issues skipped: {} before offset, {} already imported",
        summary.issues_skipped, summary.issues_already_imported
    );
    println!("  Issues failed: {}", summary.issues_failed());
    for failure in &summary.failures {
        println!("    #{} {}: {}", failure.index, failure.key, failure.error);
    }
    if let Some(next_offset) = summary.next_offset {
        println!("  Resume with: --start-from {next_offset}");
    }
    println!(
        "  Comments: {} scanned, {} patched",
        summary.comments_scanned, summary.comments_patched
    );
    if summary.references_unmapped > 0 {
        println!(
            "  References without a destination issue: {}",
            summary.references_unmapped
        );
    }
}
