//! Runner error types.

use crate::comments::PostProcessError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::issues::ImportError;
use crate::labels::LabelError;
use crate::ledger::LedgerError;
use crate::milestones::MilestoneError;
use thiserror::Error;

/// Errors that stop a migration run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Settings loading errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export loading errors.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// A reference pattern could not be compiled.
    #[error("Invalid reference pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Milestones(#[from] MilestoneError),

    #[error(transparent)]
    Labels(#[from] LabelError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    PostProcess(#[from] PostProcessError),

    /// Post-processing was requested without a ledger to map issue numbers.
    #[error("Import ledger '{path}' not found; placeholders cannot be resolved without it")]
    MissingLedger { path: String },
}
