//! Issue import error types.

use super::IssueState;
use crate::gateway::GatewayError;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while importing issues.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The resume offset is past the last issue.
    #[error("Resume offset {offset} exceeds the {total} issues in the export")]
    OffsetOutOfRange { offset: usize, total: usize },

    /// An issue references a milestone that was not synchronized.
    #[error("Issue {key} references unknown milestone '{title}'")]
    UnknownMilestone { key: String, title: String },

    /// A request to the destination failed.
    #[error("Issue {key}: request failed while {state}: {source}")]
    Gateway {
        key: String,
        state: IssueState,
        #[source]
        source: GatewayError,
    },

    /// The destination reported the import job as failed.
    #[error("Issue {key}: import job {job_id} failed: {errors}")]
    ImportFailed {
        key: String,
        job_id: u64,
        errors: String,
    },

    /// The destination reported a status other than pending/imported/failed.
    #[error("Issue {key}: import job {job_id} returned unexpected status '{status}'")]
    UnexpectedStatus {
        key: String,
        job_id: u64,
        status: String,
    },

    /// The import job stayed pending for every allowed poll.
    #[error("Issue {key}: import job {job_id} still pending after {attempts} polls")]
    PollTimedOut {
        key: String,
        job_id: u64,
        attempts: u32,
    },

    /// The run deadline passed while waiting for an import job.
    #[error("Issue {key}: run deadline reached while waiting for import job {job_id}")]
    DeadlineExceeded { key: String, job_id: u64 },

    /// The job reported success without a usable issue URL.
    #[error("Issue {key}: import job {job_id} finished without an issue URL")]
    MissingIssueUrl { key: String, job_id: u64 },

    /// Recording the import failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ImportError {
    /// Returns true if the error concerns only the issue being imported, so
    /// the remaining issues can still be attempted.
    #[must_use]
    pub fn is_issue_scoped(&self) -> bool {
        matches!(
            self,
            Self::ImportFailed { .. }
                | Self::UnexpectedStatus { .. }
                | Self::PollTimedOut { .. }
                | Self::MissingIssueUrl { .. }
        )
    }
}
