//! Access to the destination repository.
//!
//! [`GitHubGateway`] is the boundary between the migration logic and GitHub.
//! [`GitHubClient`] talks to the real API through octocrab;
//! [`InMemoryGateway`] simulates a repository for dry runs and tests.

mod error;
mod github;
mod memory;
mod types;

pub use error::GatewayError;
pub use github::GitHubClient;
pub use memory::InMemoryGateway;
pub use types::{
    ImportComment, ImportIssue, ImportJob, ImportRequest, ImportStatus, ListPage, RemoteComment,
    RemoteLabel, RemoteMilestone,
};

use std::future::Future;

/// Endpoints of the destination repository used by the migration.
///
/// Listing methods take `None` for the first page and the previous page's
/// `next` link afterwards.
pub trait GitHubGateway: Send + Sync {
    /// Lists milestones in any state.
    fn list_milestones(
        &self,
        page: Option<&str>,
    ) -> impl Future<Output = Result<ListPage<RemoteMilestone>, GatewayError>> + Send;

    /// Creates a milestone.
    fn create_milestone(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<RemoteMilestone, GatewayError>> + Send;

    /// Fetches a label by name. A missing label is [`GatewayError::NotFound`].
    fn get_label(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<RemoteLabel, GatewayError>> + Send;

    /// Creates a label with a six digit hex colour.
    fn create_label(
        &self,
        name: &str,
        colour: &str,
    ) -> impl Future<Output = Result<RemoteLabel, GatewayError>> + Send;

    /// Submits an issue with its comments for asynchronous import.
    fn submit_import(
        &self,
        request: &ImportRequest,
    ) -> impl Future<Output = Result<ImportJob, GatewayError>> + Send;

    /// Queries the state of an import job.
    fn import_status(
        &self,
        job_id: u64,
    ) -> impl Future<Output = Result<ImportJob, GatewayError>> + Send;

    /// Lists issue comments across the whole repository.
    fn list_comments(
        &self,
        page: Option<&str>,
    ) -> impl Future<Output = Result<ListPage<RemoteComment>, GatewayError>> + Send;

    /// Replaces the body of an issue comment.
    fn update_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

impl<G: GitHubGateway> GitHubGateway for &G {
    fn list_milestones(
        &self,
        page: Option<&str>,
    ) -> impl Future<Output = Result<ListPage<RemoteMilestone>, GatewayError>> + Send {
        (**self).list_milestones(page)
    }

    fn create_milestone(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<RemoteMilestone, GatewayError>> + Send {
        (**self).create_milestone(title)
    }

    fn get_label(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<RemoteLabel, GatewayError>> + Send {
        (**self).get_label(name)
    }

    fn create_label(
        &self,
        name: &str,
        colour: &str,
    ) -> impl Future<Output = Result<RemoteLabel, GatewayError>> + Send {
        (**self).create_label(name, colour)
    }

    fn submit_import(
        &self,
        request: &ImportRequest,
    ) -> impl Future<Output = Result<ImportJob, GatewayError>> + Send {
        (**self).submit_import(request)
    }

    fn import_status(
        &self,
        job_id: u64,
    ) -> impl Future<Output = Result<ImportJob, GatewayError>> + Send {
        (**self).import_status(job_id)
    }

    fn list_comments(
        &self,
        page: Option<&str>,
    ) -> impl Future<Output = Result<ListPage<RemoteComment>, GatewayError>> + Send {
        (**self).list_comments(page)
    }

    fn update_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).update_comment(comment_id, body)
    }
}
