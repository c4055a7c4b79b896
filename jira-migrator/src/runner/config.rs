//! Runner configuration.

use crate::config::Settings;
use crate::issues::FailurePolicy;
use std::fmt;
use std::path::{Path, PathBuf};

/// Part of the migration a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Synchronize milestones.
    Milestones,
    /// Synchronize labels.
    Labels,
    /// Import issues.
    Issues,
    /// Resolve placeholders in comments.
    PostProcess,
    /// Every stage, in order.
    All,
}

impl Stage {
    /// Returns true if running `self` performs `stage`.
    #[must_use]
    pub fn includes(self, stage: Stage) -> bool {
        self == stage || self == Stage::All
    }

    /// Returns true if the stage needs the project export.
    #[must_use]
    pub fn needs_export(self) -> bool {
        self != Stage::PostProcess
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Milestones => "milestones",
            Self::Labels => "labels",
            Self::Issues => "issues",
            Self::PostProcess => "post-process",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the project export.
    export_path: PathBuf,
    /// Owner of the destination repository.
    owner: String,
    /// Name of the destination repository.
    repo: String,
    /// GitHub token used for API calls.
    token: String,
    stage: Stage,
    /// Index of the first issue to import.
    start_from: usize,
    /// Path to the import ledger.
    ledger_path: PathBuf,
    /// Whether to run against a simulated repository.
    dry_run: bool,
    settings: Settings,
}

impl RunnerConfig {
    /// Creates a new configuration for a run with default settings.
    pub fn new(export_path: PathBuf, owner: String, repo: String, token: String, stage: Stage) -> Self {
        Self {
            export_path,
            owner,
            repo,
            token,
            stage,
            start_from: 0,
            ledger_path: PathBuf::from("import-ledger.json"),
            dry_run: false,
            settings: Settings::default(),
        }
    }

    pub fn with_start_from(mut self, start_from: usize) -> Self {
        self.start_from = start_from;
        self
    }

    pub fn with_ledger_path(mut self, ledger_path: PathBuf) -> Self {
        self.ledger_path = ledger_path;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replaces the settings, including any earlier overrides.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Overrides the failure policy from the settings.
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.settings.failure_policy = failure_policy;
        self
    }

    /// Overrides the post-processing concurrency from the settings.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.settings.concurrency = concurrency.max(1);
        self
    }

    /// Returns the export file path.
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn start_from(&self) -> usize {
        self.start_from
    }

    /// Returns the ledger file path.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
