//! Issue import.
//!
//! Issues are imported one at a time, in export order, through GitHub's
//! asynchronous issue import endpoint (the regular creation endpoint trips
//! abuse limits at migration volume). Each issue gets its milestone resolved,
//! its relationships flattened into comments and every source reference in
//! its comments encoded as a placeholder, then it is submitted and polled
//! until GitHub reports the created issue.

mod error;
mod policy;
mod poll;
mod state;

pub use error::ImportError;
pub use policy::{Backoff, FailurePolicy, PollPolicy};
pub use state::IssueState;

use crate::export::{Issue, MilestoneRef};
use crate::gateway::{GitHubGateway, ImportComment, ImportIssue, ImportRequest};
use crate::ledger::ImportLedger;
use crate::milestones::MilestoneMap;
use crate::references::ReferenceEncoder;
use crate::relationships::materialize_relationships;
use poll::wait_for_import;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Everything the import stage needs besides the issues themselves.
#[derive(Debug, Clone)]
pub struct ImportOptions<'a> {
    pub milestones: &'a MilestoneMap,
    pub encoder: &'a ReferenceEncoder,
    pub poll: PollPolicy,
    pub failure_policy: FailurePolicy,
    /// Point in time after which no further polling starts.
    pub deadline: Option<Instant>,
}

/// An issue that could not be imported.
#[derive(Debug, Clone, Serialize)]
pub struct IssueFailure {
    /// Position of the issue in the export.
    pub index: usize,
    pub key: String,
    pub error: String,
}

/// Outcome of the import stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Issues skipped because of the resume offset.
    pub skipped: usize,
    /// Issues skipped because the ledger already records them.
    pub already_imported: usize,
    /// Issues imported during this run.
    pub imported: usize,
    /// Issues that could not be imported.
    pub failures: Vec<IssueFailure>,
    /// Whether the stage stopped at a failure before reaching the end.
    pub halted: bool,
    /// Offset to pass to resume after this run.
    pub next_offset: usize,
}

/// Imports `issues[start_from..]`, recording each in the ledger.
///
/// The first `start_from` issues are skipped untouched. Issues after the
/// offset that the ledger already records are skipped too, so rerunning from
/// an earlier offset never duplicates an issue.
///
/// # Errors
///
/// Returns [`ImportError`] for failures that affect the whole stage: a bad
/// offset, an unverifiable resume, an unknown milestone, an unreachable
/// destination, a passed deadline or an unwritable ledger. Failures confined
/// to one issue are reported in [`ImportReport::failures`] and either halt
/// or continue the stage depending on [`ImportOptions::failure_policy`].
pub async fn import_issues<G: GitHubGateway>(
    gateway: &G,
    issues: &mut [Issue],
    start_from: usize,
    ledger: &mut ImportLedger,
    options: &ImportOptions<'_>,
) -> Result<ImportReport, ImportError> {
    let total = issues.len();
    if start_from > total {
        return Err(ImportError::OffsetOutOfRange {
            offset: start_from,
            total,
        });
    }
    ledger.verify_resume(start_from, issues.iter().map(|issue| issue.key.as_str()))?;

    info!(total, start_from, "Importing issues");
    let mut report = ImportReport {
        skipped: start_from,
        next_offset: start_from,
        ..ImportReport::default()
    };

    for (index, issue) in issues.iter_mut().enumerate().skip(start_from) {
        if ledger.contains(&issue.key) {
            warn!(index, key = %issue.key, "Issue already recorded as imported, skipping");
            report.already_imported += 1;
            if report.failures.is_empty() {
                report.next_offset = index + 1;
            }
            continue;
        }

        let span = info_span!("import_issue", index, key = %issue.key);
        match import_issue(gateway, issue, options).instrument(span).await {
            Ok(number) => {
                ledger.record(&issue.key, number)?;
                report.imported += 1;
                if report.failures.is_empty() {
                    report.next_offset = index + 1;
                }
            }
            Err(e) if e.is_issue_scoped() => {
                error!(index, key = %issue.key, error = %e, "Issue import failed");
                report.failures.push(IssueFailure {
                    index,
                    key: issue.key.clone(),
                    error: e.to_string(),
                });
                if options.failure_policy == FailurePolicy::Halt {
                    report.halted = true;
                    break;
                }
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        imported = report.imported,
        failed = report.failures.len(),
        next_offset = report.next_offset,
        "Issue import finished"
    );
    Ok(report)
}

/// Drives one issue from `Pending` to `Done`.
async fn import_issue<G: GitHubGateway>(
    gateway: &G,
    issue: &mut Issue,
    options: &ImportOptions<'_>,
) -> Result<u64, ImportError> {
    info!(title = %issue.title, "Importing issue");
    let mut state = IssueState::Pending;

    resolve_milestone(issue, options.milestones)?;
    advance(&mut state, IssueState::MilestoneResolved);

    for comment in &mut issue.comments {
        comment.body = options.encoder.encode(&comment.body);
    }
    materialize_relationships(issue, options.encoder);
    advance(&mut state, IssueState::RelationshipsFlattened);

    let request = build_request(issue);
    let job = gateway
        .submit_import(&request)
        .await
        .map_err(|source| ImportError::Gateway {
            key: issue.key.clone(),
            state: IssueState::Submitted,
            source,
        })?;
    advance(&mut state, IssueState::Submitted);
    debug!(job_id = job.id, "Import submitted");

    advance(&mut state, IssueState::ImportPending);
    let number = match wait_for_import(gateway, &issue.key, job.id, &options.poll, options.deadline)
        .await
    {
        Ok(number) => number,
        Err(e) => {
            advance(&mut state, IssueState::Failed);
            return Err(e);
        }
    };
    advance(&mut state, IssueState::Imported);

    issue.destination_number = Some(number);
    info!(number, "Imported issue");
    advance(&mut state, IssueState::Done);
    Ok(number)
}

fn advance(state: &mut IssueState, next: IssueState) {
    debug!(from = %state, to = %next, "Issue state");
    *state = next;
}

/// Replaces the milestone title with the destination milestone number.
fn resolve_milestone(issue: &mut Issue, milestones: &MilestoneMap) -> Result<(), ImportError> {
    if let Some(MilestoneRef::Title(title)) = &issue.milestone {
        let number = milestones
            .get(title)
            .ok_or_else(|| ImportError::UnknownMilestone {
                key: issue.key.clone(),
                title: title.clone(),
            })?;
        issue.milestone = Some(MilestoneRef::Resolved(number));
    }
    Ok(())
}

/// Builds the import payload. The source key has no field at the destination.
fn build_request(issue: &Issue) -> ImportRequest {
    let milestone = match issue.milestone {
        Some(MilestoneRef::Resolved(number)) => Some(number),
        Some(MilestoneRef::Title(_)) | None => None,
    };

    ImportRequest {
        issue: ImportIssue {
            title: issue.title.clone(),
            body: issue.body.clone(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            closed: issue.closed,
            milestone,
            labels: issue.labels.clone(),
        },
        comments: issue
            .comments
            .iter()
            .map(|comment| ImportComment {
                created_at: comment.created_at,
                body: comment.body.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Comment, RelationshipKind};
    use crate::gateway::InMemoryGateway;

    fn issue(n: u64) -> Issue {
        let time = chrono::DateTime::parse_from_rfc3339("2015-01-02T03:04:05+00:00").unwrap();
        Issue {
            key: format!("PROJ-{n}"),
            title: format!("Issue {n} title"),
            body: "body".to_string(),
            created_at: time,
            updated_at: time,
            closed_at: None,
            closed: false,
            milestone: None,
            labels: vec!["bug".to_string()],
            comments: Vec::new(),
            relationships: Default::default(),
            destination_number: None,
        }
    }

    fn encoder() -> ReferenceEncoder {
        ReferenceEncoder::new("PROJ", "https://java.net/jira/browse/", "GH-").unwrap()
    }

    fn options<'a>(milestones: &'a MilestoneMap, encoder: &'a ReferenceEncoder) -> ImportOptions<'a> {
        ImportOptions {
            milestones,
            encoder,
            poll: PollPolicy::default(),
            failure_policy: FailurePolicy::Halt,
            deadline: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn imports_issue_with_milestone_and_relationships() {
        let gateway = InMemoryGateway::new().with_pending_polls(1);
        let milestones = MilestoneMap::from_iter([("1.0".to_string(), 4)]);
        let encoder = encoder();
        let mut issues = vec![issue(1)];
        issues[0].milestone = Some(MilestoneRef::Title("1.0".to_string()));
        issues[0].comments.push(Comment::synthetic("see PROJ-2".to_string()));
        issues[0]
            .relationships
            .insert(RelationshipKind::DependsOn, vec!["PROJ-42".to_string()]);
        let mut ledger = ImportLedger::in_memory("PROJ");

        let report = import_issues(&gateway, &mut issues, 0, &mut ledger, &options(&milestones, &encoder))
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.next_offset, 1);
        assert_eq!(issues[0].destination_number, Some(1));
        assert_eq!(issues[0].milestone, Some(MilestoneRef::Resolved(4)));
        assert!(issues[0].relationships.is_empty());

        let (_, request) = &gateway.issues()[0];
        assert_eq!(request.issue.milestone, Some(4));
        let bodies: Vec<_> = request.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["see @PSTARTGH-2@PEND", "Depends on: @PSTARTGH-42@PEND"]);
        assert_eq!(ledger.entries()[0].key, "PROJ-1");
    }

    #[tokio::test]
    async fn resume_offset_skips_leading_issues() {
        let gateway = InMemoryGateway::new();
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues: Vec<_> = (1..=5).map(issue).collect();
        let mut ledger = ImportLedger::in_memory("PROJ");

        let report = import_issues(&gateway, &mut issues, 2, &mut ledger, &options(&milestones, &encoder))
            .await
            .unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(report.imported, 3);
        assert_eq!(gateway.submissions(), 3);
        assert!(issues[0].destination_number.is_none());
        assert_eq!(issues[2].destination_number, Some(1));
    }

    #[tokio::test]
    async fn offset_past_end_is_rejected() {
        let gateway = InMemoryGateway::new();
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues = vec![issue(1)];
        let mut ledger = ImportLedger::in_memory("PROJ");

        let result = import_issues(&gateway, &mut issues, 2, &mut ledger, &options(&milestones, &encoder)).await;

        assert!(matches!(result, Err(ImportError::OffsetOutOfRange { offset: 2, total: 1 })));
    }

    #[tokio::test]
    async fn unknown_milestone_aborts() {
        let gateway = InMemoryGateway::new();
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues = vec![issue(1)];
        issues[0].milestone = Some(MilestoneRef::Title("9.9".to_string()));
        let mut ledger = ImportLedger::in_memory("PROJ");

        let result = import_issues(&gateway, &mut issues, 0, &mut ledger, &options(&milestones, &encoder)).await;

        assert!(matches!(result, Err(ImportError::UnknownMilestone { .. })));
        assert_eq!(gateway.submissions(), 0);
    }

    #[tokio::test]
    async fn halt_policy_stops_at_first_failure() {
        let gateway = InMemoryGateway::new().failing_import("Issue 2 title");
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues: Vec<_> = (1..=3).map(issue).collect();
        let mut ledger = ImportLedger::in_memory("PROJ");

        let report = import_issues(&gateway, &mut issues, 0, &mut ledger, &options(&milestones, &encoder))
            .await
            .unwrap();

        assert!(report.halted);
        assert_eq!(report.imported, 1);
        assert_eq!(report.failures[0].key, "PROJ-2");
        assert_eq!(report.next_offset, 1);
        assert_eq!(gateway.submissions(), 2);
    }

    #[tokio::test]
    async fn continue_policy_imports_remaining_issues() {
        let gateway = InMemoryGateway::new().import_status_for("Issue 2 title", "exploded");
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues: Vec<_> = (1..=3).map(issue).collect();
        let mut ledger = ImportLedger::in_memory("PROJ");
        let options = ImportOptions {
            failure_policy: FailurePolicy::Continue,
            ..options(&milestones, &encoder)
        };

        let report = import_issues(&gateway, &mut issues, 0, &mut ledger, &options)
            .await
            .unwrap();

        assert!(!report.halted);
        assert_eq!(report.imported, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.next_offset, 1);
        assert_eq!(issues[2].destination_number, Some(2));
    }

    #[tokio::test]
    async fn rerun_skips_issues_already_in_ledger() {
        let gateway = InMemoryGateway::new();
        let milestones = MilestoneMap::default();
        let encoder = encoder();
        let mut issues: Vec<_> = (1..=3).map(issue).collect();
        let mut ledger = ImportLedger::in_memory("PROJ");
        ledger.record("PROJ-1", 1).unwrap();
        ledger.record("PROJ-3", 2).unwrap();

        let report = import_issues(&gateway, &mut issues, 1, &mut ledger, &options(&milestones, &encoder))
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.already_imported, 1);
        assert_eq!(report.next_offset, 3);
        assert_eq!(gateway.submissions(), 1);
    }
}
