//! Waiting for asynchronous import jobs.

use super::{ImportError, IssueState, PollPolicy};
use crate::gateway::{GitHubGateway, ImportStatus};
use tokio::time::Instant;
use tracing::debug;

/// Polls an import job until it leaves `pending`.
///
/// # Returns
///
/// The number of the created issue.
///
/// # Errors
///
/// Returns [`ImportError`] if the job fails, reports an unknown status,
/// stays pending for `policy.max_attempts` polls, or would outlive
/// `deadline`.
pub(crate) async fn wait_for_import<G: GitHubGateway>(
    gateway: &G,
    key: &str,
    job_id: u64,
    policy: &PollPolicy,
    deadline: Option<Instant>,
) -> Result<u64, ImportError> {
    for attempt in 1..=policy.max_attempts {
        let job = gateway
            .import_status(job_id)
            .await
            .map_err(|source| ImportError::Gateway {
                key: key.to_string(),
                state: IssueState::ImportPending,
                source,
            })?;

        match job.import_status() {
            ImportStatus::Pending => {
                if attempt == policy.max_attempts {
                    break;
                }
                let delay = policy.delay(attempt);
                if deadline.is_some_and(|deadline| Instant::now() + delay > deadline) {
                    return Err(ImportError::DeadlineExceeded {
                        key: key.to_string(),
                        job_id,
                    });
                }
                debug!(key, job_id, attempt, delay_ms = delay.as_millis() as u64, "Import pending");
                tokio::time::sleep(delay).await;
            }
            ImportStatus::Imported => {
                return job.issue_number().ok_or_else(|| ImportError::MissingIssueUrl {
                    key: key.to_string(),
                    job_id,
                });
            }
            ImportStatus::Failed => {
                return Err(ImportError::ImportFailed {
                    key: key.to_string(),
                    job_id,
                    errors: job
                        .errors
                        .map_or_else(|| "no details".to_string(), |e| e.to_string()),
                });
            }
            ImportStatus::Unknown(status) => {
                return Err(ImportError::UnexpectedStatus {
                    key: key.to_string(),
                    job_id,
                    status,
                });
            }
        }
    }

    Err(ImportError::PollTimedOut {
        key: key.to_string(),
        job_id,
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ImportIssue, ImportRequest, InMemoryGateway};
    use std::time::Duration;

    fn request(title: &str) -> ImportRequest {
        let time = chrono::DateTime::parse_from_rfc3339("2015-01-02T03:04:05+00:00").unwrap();
        ImportRequest {
            issue: ImportIssue {
                title: title.to_string(),
                body: String::new(),
                created_at: time,
                updated_at: time,
                closed_at: None,
                closed: false,
                milestone: None,
                labels: Vec::new(),
            },
            comments: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_through_pending_polls() {
        let gateway = InMemoryGateway::new().with_pending_polls(2);
        let job = gateway.submit_import(&request("A")).await.unwrap();

        let number = wait_for_import(&gateway, "PROJ-1", job.id, &PollPolicy::default(), None)
            .await
            .unwrap();

        assert_eq!(number, 1);
        assert_eq!(gateway.status_polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let gateway = InMemoryGateway::new().stuck_import("A");
        let job = gateway.submit_import(&request("A")).await.unwrap();
        let policy = PollPolicy {
            max_attempts: 4,
            ..PollPolicy::default()
        };

        let result = wait_for_import(&gateway, "PROJ-1", job.id, &policy, None).await;

        assert!(matches!(result, Err(ImportError::PollTimedOut { attempts: 4, .. })));
        assert_eq!(gateway.status_polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_deadline() {
        let gateway = InMemoryGateway::new().stuck_import("A");
        let job = gateway.submit_import(&request("A")).await.unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);

        let result =
            wait_for_import(&gateway, "PROJ-1", job.id, &PollPolicy::default(), Some(deadline))
                .await;

        assert!(matches!(result, Err(ImportError::DeadlineExceeded { .. })));
        assert_eq!(gateway.status_polls(), 4);
    }

    #[tokio::test]
    async fn failed_and_unknown_statuses_are_terminal() {
        let gateway = InMemoryGateway::new()
            .failing_import("bad")
            .import_status_for("odd", "exploded");
        let bad = gateway.submit_import(&request("bad")).await.unwrap();
        let odd = gateway.submit_import(&request("odd")).await.unwrap();
        let policy = PollPolicy::default();

        let bad = wait_for_import(&gateway, "PROJ-1", bad.id, &policy, None).await;
        let odd = wait_for_import(&gateway, "PROJ-2", odd.id, &policy, None).await;

        assert!(matches!(bad, Err(ImportError::ImportFailed { .. })));
        assert!(matches!(odd, Err(ImportError::UnexpectedStatus { ref status, .. }) if status == "exploded"));
        assert_eq!(gateway.status_polls(), 2);
    }
}
