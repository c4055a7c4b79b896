//! In-memory destination repository.
//!
//! Imports complete after a configurable number of pending polls and their
//! comments become listable, so every stage can run without network access.

use super::{
    GatewayError, GitHubGateway, ImportJob, ImportRequest, ListPage, RemoteComment, RemoteLabel,
    RemoteMilestone,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const PAGE_LINK_PREFIX: &str = "memory://";
const DEFAULT_PAGE_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Import,
    Fail,
    Status(String),
    Stuck,
}

#[derive(Debug)]
struct Job {
    request: ImportRequest,
    polls_left: u32,
    outcome: Outcome,
    issue_number: Option<u64>,
}

#[derive(Debug, Default)]
struct State {
    milestones: Vec<RemoteMilestone>,
    labels: Vec<RemoteLabel>,
    issues: Vec<(u64, ImportRequest)>,
    jobs: HashMap<u64, Job>,
    comments: Vec<RemoteComment>,
    patches: Vec<(u64, String)>,
    next_issue_number: u64,
    next_job_id: u64,
    next_comment_id: u64,
    milestones_created: usize,
    labels_created: usize,
    submissions: usize,
    status_polls: usize,
}

/// A simulated GitHub repository.
#[derive(Debug)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    page_size: usize,
    pending_polls: u32,
    outcomes: HashMap<String, Outcome>,
    label_fetch_status: Option<u16>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_issue_number: 1,
                next_job_id: 1,
                next_comment_id: 1,
                ..State::default()
            }),
            page_size: DEFAULT_PAGE_SIZE,
            pending_polls: 0,
            outcomes: HashMap::new(),
            label_fetch_status: None,
        }
    }

    /// Sets how many items a listing page holds.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets how many times each import reports `pending` before finishing.
    #[must_use]
    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Adds an existing milestone.
    #[must_use]
    pub fn with_milestone(mut self, title: &str) -> Self {
        let state = self.state_mut();
        let number = state.milestones.len() as u64 + 1;
        state.milestones.push(RemoteMilestone {
            number,
            title: title.to_string(),
        });
        self
    }

    /// Adds an existing label.
    #[must_use]
    pub fn with_label(mut self, name: &str) -> Self {
        self.state_mut().labels.push(RemoteLabel {
            name: name.to_string(),
            color: "ededed".to_string(),
        });
        self
    }

    /// Adds an existing comment.
    #[must_use]
    pub fn with_comment(mut self, body: &str) -> Self {
        let state = self.state_mut();
        let id = state.next_comment_id;
        state.next_comment_id += 1;
        state.comments.push(RemoteComment {
            id,
            body: body.to_string(),
        });
        self
    }

    /// Pretends `count` issues already exist, shifting new issue numbers.
    #[must_use]
    pub fn with_existing_issues(mut self, count: u64) -> Self {
        self.state_mut().next_issue_number = count + 1;
        self
    }

    /// Makes imports of issues with this title fail.
    #[must_use]
    pub fn failing_import(mut self, title: &str) -> Self {
        self.outcomes.insert(title.to_string(), Outcome::Fail);
        self
    }

    /// Makes imports of issues with this title never leave `pending`.
    #[must_use]
    pub fn stuck_import(mut self, title: &str) -> Self {
        self.outcomes.insert(title.to_string(), Outcome::Stuck);
        self
    }

    /// Makes imports of issues with this title report an arbitrary status.
    #[must_use]
    pub fn import_status_for(mut self, title: &str, status: &str) -> Self {
        self.outcomes
            .insert(title.to_string(), Outcome::Status(status.to_string()));
        self
    }

    /// Makes every label fetch fail with this HTTP status.
    #[must_use]
    pub fn failing_label_fetch(mut self, status: u16) -> Self {
        self.label_fetch_status = Some(status);
        self
    }

    /// Returns the milestones in the repository.
    #[must_use]
    pub fn milestones(&self) -> Vec<RemoteMilestone> {
        self.state().milestones.clone()
    }

    /// Returns the labels in the repository.
    #[must_use]
    pub fn labels(&self) -> Vec<RemoteLabel> {
        self.state().labels.clone()
    }

    /// Returns imported issues with their numbers, in creation order.
    #[must_use]
    pub fn issues(&self) -> Vec<(u64, ImportRequest)> {
        self.state().issues.clone()
    }

    /// Returns all comments in the repository.
    #[must_use]
    pub fn comments(&self) -> Vec<RemoteComment> {
        self.state().comments.clone()
    }

    /// Returns every comment update, in order.
    #[must_use]
    pub fn patches(&self) -> Vec<(u64, String)> {
        self.state().patches.clone()
    }

    #[must_use]
    pub fn milestones_created(&self) -> usize {
        self.state().milestones_created
    }

    #[must_use]
    pub fn labels_created(&self) -> usize {
        self.state().labels_created
    }

    /// Returns how many imports were submitted.
    #[must_use]
    pub fn submissions(&self) -> usize {
        self.state().submissions
    }

    /// Returns how many import status queries were answered.
    #[must_use]
    pub fn status_polls(&self) -> usize {
        self.state().status_polls
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn page<T: Clone>(
        &self,
        resource: &str,
        items: &[T],
        page: Option<&str>,
    ) -> Result<ListPage<T>, GatewayError> {
        let index = match page {
            None => 0,
            Some(link) => parse_page_link(resource, link)?,
        };
        let start = (index * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        let next = (end < items.len())
            .then(|| format!("{PAGE_LINK_PREFIX}{resource}?page={}", index + 1));
        Ok(ListPage {
            items: items[start..end].to_vec(),
            next,
        })
    }
}

fn parse_page_link(resource: &str, link: &str) -> Result<usize, GatewayError> {
    link.strip_prefix(PAGE_LINK_PREFIX)
        .and_then(|rest| rest.strip_prefix(resource))
        .and_then(|rest| rest.strip_prefix("?page="))
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| GatewayError::Decode {
            route: link.to_string(),
            message: format!("not a {resource} page link"),
        })
}

fn already_exists(route: &str) -> GatewayError {
    GatewayError::Status {
        route: route.to_string(),
        status: 422,
        message: "Validation Failed: already_exists".to_string(),
    }
}

fn job_view(id: u64, job: &Job) -> ImportJob {
    ImportJob {
        id,
        status: "pending".to_string(),
        issue_url: job
            .issue_number
            .map(|n| format!("https://api.github.com/repos/memory/repo/issues/{n}")),
        errors: None,
    }
}

impl GitHubGateway for InMemoryGateway {
    async fn list_milestones(
        &self,
        page: Option<&str>,
    ) -> Result<ListPage<RemoteMilestone>, GatewayError> {
        let milestones = self.milestones();
        self.page("milestones", &milestones, page)
    }

    async fn create_milestone(&self, title: &str) -> Result<RemoteMilestone, GatewayError> {
        let mut state = self.state();
        if state.milestones.iter().any(|m| m.title == title) {
            return Err(already_exists("/milestones"));
        }
        let milestone = RemoteMilestone {
            number: state.milestones.len() as u64 + 1,
            title: title.to_string(),
        };
        state.milestones.push(milestone.clone());
        state.milestones_created += 1;
        Ok(milestone)
    }

    async fn get_label(&self, name: &str) -> Result<RemoteLabel, GatewayError> {
        let route = format!("/labels/{name}");
        if let Some(status) = self.label_fetch_status {
            return Err(GatewayError::Status {
                route,
                status,
                message: "simulated failure".to_string(),
            });
        }
        self.state()
            .labels
            .iter()
            .find(|label| label.name == name)
            .cloned()
            .ok_or(GatewayError::NotFound { route })
    }

    async fn create_label(&self, name: &str, colour: &str) -> Result<RemoteLabel, GatewayError> {
        let mut state = self.state();
        if state.labels.iter().any(|label| label.name == name) {
            return Err(already_exists("/labels"));
        }
        let label = RemoteLabel {
            name: name.to_string(),
            color: colour.to_string(),
        };
        state.labels.push(label.clone());
        state.labels_created += 1;
        Ok(label)
    }

    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportJob, GatewayError> {
        let outcome = self
            .outcomes
            .get(&request.issue.title)
            .cloned()
            .unwrap_or(Outcome::Import);
        let mut state = self.state();
        let id = state.next_job_id;
        state.next_job_id += 1;
        state.submissions += 1;
        let job = Job {
            request: request.clone(),
            polls_left: self.pending_polls,
            outcome,
            issue_number: None,
        };
        let view = job_view(id, &job);
        state.jobs.insert(id, job);
        Ok(view)
    }

    async fn import_status(&self, job_id: u64) -> Result<ImportJob, GatewayError> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.status_polls += 1;
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| GatewayError::NotFound {
                route: format!("/import/issues/{job_id}"),
            })?;

        if job.polls_left > 0 || job.outcome == Outcome::Stuck {
            job.polls_left = job.polls_left.saturating_sub(1);
            return Ok(job_view(job_id, job));
        }

        let mut view = job_view(job_id, job);
        match &job.outcome {
            Outcome::Import => {
                if job.issue_number.is_none() {
                    let number = state.next_issue_number;
                    state.next_issue_number += 1;
                    job.issue_number = Some(number);
                    state.issues.push((number, job.request.clone()));
                    for comment in &job.request.comments {
                        let id = state.next_comment_id;
                        state.next_comment_id += 1;
                        state.comments.push(RemoteComment {
                            id,
                            body: comment.body.clone(),
                        });
                    }
                }
                view = job_view(job_id, job);
                view.status = "imported".to_string();
            }
            Outcome::Fail => {
                view.status = "failed".to_string();
                view.errors = Some(serde_json::json!([
                    { "location": "/issue/title", "code": "invalid" }
                ]));
            }
            Outcome::Status(status) => view.status.clone_from(status),
            Outcome::Stuck => {}
        }
        Ok(view)
    }

    async fn list_comments(
        &self,
        page: Option<&str>,
    ) -> Result<ListPage<RemoteComment>, GatewayError> {
        let comments = self.comments();
        self.page("comments", &comments, page)
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<(), GatewayError> {
        let mut state = self.state();
        let comment = state
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| GatewayError::NotFound {
                route: format!("/issues/comments/{comment_id}"),
            })?;
        comment.body = body.to_string();
        state.patches.push((comment_id, body.to_string()));
        Ok(())
    }
}
