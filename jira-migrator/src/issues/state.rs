//! Per-issue import states.

use serde::Serialize;
use std::fmt;

/// Where an issue is in its import.
///
/// `Pending -> MilestoneResolved -> RelationshipsFlattened -> Submitted ->
/// ImportPending -> Imported -> Done`, or `Failed` from `Submitted` or
/// `ImportPending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Pending,
    MilestoneResolved,
    RelationshipsFlattened,
    Submitted,
    ImportPending,
    Imported,
    Done,
    Failed,
}

impl IssueState {
    /// Returns the state as a string for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::MilestoneResolved => "milestone_resolved",
            Self::RelationshipsFlattened => "relationships_flattened",
            Self::Submitted => "submitted",
            Self::ImportPending => "import_pending",
            Self::Imported => "imported",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
