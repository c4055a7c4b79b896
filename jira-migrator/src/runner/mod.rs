//! Orchestrates a migration run.
//!
//! Stages run in dependency order: milestones, labels, issues, then comment
//! post-processing. Each can also run alone; the import ledger carries the
//! source to destination number mapping between separate invocations.

mod config;
mod error;

pub use config::{RunnerConfig, Stage};
pub use error::RunnerError;

use crate::comments::resolve_all;
use crate::export::{load_snapshot, ProjectSnapshot};
use crate::gateway::{GitHubClient, GitHubGateway};
use crate::issues::{import_issues, ImportOptions};
use crate::labels::{sync_labels, PaletteColourSelector};
use crate::ledger::ImportLedger;
use crate::milestones::{sync_milestones, MilestoneMap};
use crate::references::{PlaceholderResolver, ReferenceEncoder};
use crate::summary::RunSummary;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs the configured stages against a destination repository.
pub struct Runner<G = GitHubClient> {
    config: RunnerConfig,
    gateway: G,
}

impl Runner<GitHubClient> {
    /// Builds a runner talking to GitHub.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let gateway =
            GitHubClient::new(config.token().to_string(), config.owner(), config.repo())?;
        Ok(Self { config, gateway })
    }
}

impl<G: GitHubGateway> Runner<G> {
    /// Builds a runner on top of an existing gateway.
    pub fn with_gateway(config: RunnerConfig, gateway: G) -> Self {
        Self { config, gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Executes the configured stages.
    ///
    /// Per-issue import failures are reported in the summary rather than as
    /// an error.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let stage = self.config.stage();
        let mut summary = RunSummary::new(self.config.dry_run());
        info!(
            stage = %stage,
            owner = self.config.owner(),
            repo = self.config.repo(),
            dry_run = self.config.dry_run(),
            "Starting migration"
        );

        let mut ledger = None;
        if stage.needs_export() {
            let mut snapshot = load_snapshot(self.config.export_path())?;
            info!(project = %snapshot.name, issues = snapshot.issues.len(), "Loaded export");
            ledger = self.run_export_stages(&mut snapshot, &mut summary).await?;
        }

        if stage.includes(Stage::PostProcess) {
            if summary.has_failures() {
                warn!(
                    failed = summary.issues_failed(),
                    "Skipping comment post-processing until every issue is imported"
                );
            } else {
                self.post_process(ledger, &mut summary).await?;
            }
        }

        Ok(summary)
    }

    /// Runs the stages that need the export. Returns the ledger if issues
    /// were imported.
    async fn run_export_stages(
        &self,
        snapshot: &mut ProjectSnapshot,
        summary: &mut RunSummary,
    ) -> Result<Option<ImportLedger>, RunnerError> {
        let stage = self.config.stage();
        let settings = self.config.settings();

        let mut milestones = None;
        if stage.includes(Stage::Milestones) {
            let map = sync_milestones(&self.gateway, &snapshot.milestone_titles()).await?;
            summary.record_milestones(&map);
            milestones = Some(map);
        }

        if stage.includes(Stage::Labels) {
            let colours = PaletteColourSelector::new(settings.label_colours.clone());
            let labels = snapshot.all_labels();
            let result =
                sync_labels(&self.gateway, labels.iter().map(String::as_str), &colours).await?;
            summary.record_labels(result);
        }

        if !stage.includes(Stage::Issues) {
            return Ok(None);
        }

        let milestones = match milestones {
            Some(map) => map,
            None => self.resolve_milestones(snapshot).await?,
        };
        let encoder = ReferenceEncoder::new(
            &snapshot.name,
            &settings.source_browse_url,
            &settings.destination_marker,
        )?;
        let mut ledger = self.open_ledger(&snapshot.name)?;
        let options = ImportOptions {
            milestones: &milestones,
            encoder: &encoder,
            poll: settings.poll_policy(),
            failure_policy: settings.failure_policy,
            deadline: settings.run_timeout().map(|timeout| Instant::now() + timeout),
        };

        let report = import_issues(
            &self.gateway,
            &mut snapshot.issues,
            self.config.start_from(),
            &mut ledger,
            &options,
        )
        .await?;
        summary.record_import(&report);

        Ok(Some(ledger))
    }

    /// Milestone numbers for an issue stage run on its own. Synchronization
    /// is idempotent, so this only creates titles that are still missing.
    async fn resolve_milestones(
        &self,
        snapshot: &ProjectSnapshot,
    ) -> Result<MilestoneMap, RunnerError> {
        debug!("Resolving milestone numbers");
        Ok(sync_milestones(&self.gateway, &snapshot.milestone_titles()).await?)
    }

    fn open_ledger(&self, project: &str) -> Result<ImportLedger, RunnerError> {
        if self.config.dry_run() {
            return Ok(ImportLedger::in_memory(project));
        }
        Ok(ImportLedger::open(self.config.ledger_path(), project)?)
    }

    async fn post_process(
        &self,
        ledger: Option<ImportLedger>,
        summary: &mut RunSummary,
    ) -> Result<(), RunnerError> {
        let settings = self.config.settings();
        let path = self.config.ledger_path();

        let ledger = match ledger {
            Some(ledger) => ledger,
            None if !self.config.dry_run() => {
                if !path.exists() {
                    return Err(RunnerError::MissingLedger {
                        path: path.display().to_string(),
                    });
                }
                ImportLedger::load(path)?
            }
            None => {
                warn!(
                    path = %path.display(),
                    "No import ledger available, references keep their source numbers"
                );
                ImportLedger::in_memory("")
            }
        };

        let resolver = PlaceholderResolver::new(&settings.destination_marker, ledger.id_map())?;
        let report = resolve_all(&self.gateway, &resolver, settings.concurrency).await?;
        summary.record_post_process(&report);
        Ok(())
    }
}
