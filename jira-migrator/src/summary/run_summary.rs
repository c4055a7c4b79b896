//! Run summary types.

use crate::comments::PostProcessReport;
use crate::issues::{ImportReport, IssueFailure};
use crate::labels::LabelSummary;
use crate::milestones::MilestoneMap;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Milestones that already existed at the destination.
    pub milestones_existing: usize,

    /// Milestones created during the run.
    pub milestones_created: usize,

    /// Labels that already existed at the destination.
    pub labels_existing: usize,

    /// Labels created during the run.
    pub labels_created: usize,

    /// Issues before the resume offset.
    pub issues_skipped: usize,

    /// Issues skipped because an earlier run imported them.
    pub issues_already_imported: usize,

    /// Issues imported during the run.
    pub issues_imported: usize,

    /// Issues that could not be imported.
    pub failures: Vec<IssueFailure>,

    /// Whether the issue stage stopped early at a failure.
    pub halted: bool,

    /// Offset to resume the issue stage from, if it ran.
    pub next_offset: Option<usize>,

    /// Comments inspected during post-processing.
    pub comments_scanned: usize,

    /// Comments rewritten during post-processing.
    pub comments_patched: usize,

    /// References left with their source number.
    pub references_unmapped: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record_milestones(&mut self, milestones: &MilestoneMap) {
        self.milestones_existing += milestones.existing;
        self.milestones_created += milestones.created;
    }

    pub fn record_labels(&mut self, labels: LabelSummary) {
        self.labels_existing += labels.existing;
        self.labels_created += labels.created;
    }

    /// Updates the summary with the outcome of the issue stage.
    pub fn record_import(&mut self, report: &ImportReport) {
        self.issues_skipped += report.skipped;
        self.issues_already_imported += report.already_imported;
        self.issues_imported += report.imported;
        self.failures.extend(report.failures.iter().cloned());
        self.halted |= report.halted;
        self.next_offset = Some(report.next_offset);
    }

    pub fn record_post_process(&mut self, report: &PostProcessReport) {
        self.comments_scanned += report.scanned;
        self.comments_patched += report.patched;
        self.references_unmapped += report.unmapped;
    }

    /// Number of issues that failed to import.
    #[must_use]
    pub fn issues_failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failures.is_empty() && !self.halted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_record_import() {
        let mut summary = RunSummary::new(false);

        summary.record_import(&ImportReport {
            skipped: 2,
            already_imported: 1,
            imported: 3,
            failures: Vec::new(),
            halted: false,
            next_offset: 6,
        });

        assert_eq!(summary.issues_imported, 3);
        assert_eq!(summary.issues_skipped, 2);
        assert_eq!(summary.next_offset, Some(6));
        assert!(summary.all_success());
    }

    #[test]
    fn failures_are_reported() {
        let mut summary = RunSummary::new(false);

        summary.record_import(&ImportReport {
            imported: 1,
            failures: vec![IssueFailure {
                index: 1,
                key: "PROJ-2".to_string(),
                error: "import job 9 failed".to_string(),
            }],
            halted: true,
            next_offset: 1,
            ..ImportReport::default()
        });

        assert!(summary.has_failures());
        assert!(!summary.all_success());
        assert_eq!(summary.issues_failed(), 1);
    }

    #[test]
    fn can_record_post_process() {
        let mut summary = RunSummary::new(true);

        summary.record_post_process(&PostProcessReport {
            pages: 2,
            scanned: 150,
            patched: 4,
            replaced: 5,
            unmapped: 1,
        });

        assert_eq!(summary.comments_scanned, 150);
        assert_eq!(summary.comments_patched, 4);
        assert_eq!(summary.references_unmapped, 1);
        assert!(summary.dry_run);
    }
}
