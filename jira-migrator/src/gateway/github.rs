//! GitHub implementation of the gateway, backed by octocrab.

use super::{
    GatewayError, GitHubGateway, ImportJob, ImportRequest, ListPage, RemoteComment, RemoteLabel,
    RemoteMilestone,
};
use crate::rate_limit::ensure_core_rate_limit;
use octocrab::{FromResponse, Octocrab, Page};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Preview required by the issue import endpoints.
const IMPORT_PREVIEW: &str = "golden-comet";

/// Results per page for listings.
const RESULTS_PER_PAGE: u8 = 100;

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Patch,
}

#[derive(Serialize)]
struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
    per_page: u8,
}

/// Gateway talking to one GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: String, owner: &str, repo: &str) -> Result<Self, octocrab::Error> {
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .add_preview(IMPORT_PREVIEW)
            .build()?;
        Ok(Self::from_octocrab(octocrab, owner, repo))
    }

    /// Wraps an existing octocrab instance.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab, owner: &str, repo: &str) -> Self {
        Self {
            octocrab,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    fn route(&self, suffix: &str) -> String {
        repo_route(&self.owner, &self.repo, suffix)
    }

    /// Executes one request. For GET, `payload` is sent as query parameters.
    async fn execute<R, P>(
        &self,
        method: Method,
        route: &str,
        payload: Option<&P>,
    ) -> Result<R, GatewayError>
    where
        R: FromResponse,
        P: Serialize + ?Sized + Sync,
    {
        debug!(?method, route, "GitHub request");
        let result = match method {
            Method::Get => self.octocrab.get(route, payload).await,
            Method::Post => self.octocrab.post(route, payload).await,
            Method::Patch => self.octocrab.patch(route, payload).await,
        };
        result.map_err(|e| GatewayError::from_octocrab(route, e))
    }

    async fn list<T>(
        &self,
        suffix: &str,
        state: Option<&'static str>,
        page: Option<&str>,
    ) -> Result<ListPage<T>, GatewayError>
    where
        T: serde::de::DeserializeOwned,
    {
        let page: Page<T> = match page {
            Some(next) => self.execute(Method::Get, next, None::<&()>).await?,
            None => {
                let params = ListParams {
                    state,
                    per_page: RESULTS_PER_PAGE,
                };
                self.execute(Method::Get, &self.route(suffix), Some(&params))
                    .await?
            }
        };
        Ok(ListPage {
            items: page.items,
            next: page.next.map(|uri| uri.to_string()),
        })
    }

    async fn before_write(&self) -> Result<(), GatewayError> {
        ensure_core_rate_limit(&self.octocrab)
            .await
            .map_err(|e| GatewayError::from_octocrab("/rate_limit", e))
    }
}

fn repo_route(owner: &str, repo: &str, suffix: &str) -> String {
    format!("/repos/{owner}/{repo}{suffix}")
}

/// Percent-encodes a single path segment.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl GitHubGateway for GitHubClient {
    async fn list_milestones(
        &self,
        page: Option<&str>,
    ) -> Result<ListPage<RemoteMilestone>, GatewayError> {
        self.list("/milestones", Some("all"), page).await
    }

    async fn create_milestone(&self, title: &str) -> Result<RemoteMilestone, GatewayError> {
        self.before_write().await?;
        self.execute(
            Method::Post,
            &self.route("/milestones"),
            Some(&json!({ "title": title })),
        )
        .await
    }

    async fn get_label(&self, name: &str) -> Result<RemoteLabel, GatewayError> {
        let route = self.route(&format!("/labels/{}", encode_segment(name)));
        self.execute(Method::Get, &route, None::<&()>).await
    }

    async fn create_label(&self, name: &str, colour: &str) -> Result<RemoteLabel, GatewayError> {
        self.before_write().await?;
        self.execute(
            Method::Post,
            &self.route("/labels"),
            Some(&json!({ "name": name, "color": colour })),
        )
        .await
    }

    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportJob, GatewayError> {
        self.before_write().await?;
        self.execute(Method::Post, &self.route("/import/issues"), Some(request))
            .await
    }

    async fn import_status(&self, job_id: u64) -> Result<ImportJob, GatewayError> {
        let route = self.route(&format!("/import/issues/{job_id}"));
        self.execute(Method::Get, &route, None::<&()>).await
    }

    async fn list_comments(
        &self,
        page: Option<&str>,
    ) -> Result<ListPage<RemoteComment>, GatewayError> {
        self.list("/issues/comments", None, page).await
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<(), GatewayError> {
        self.before_write().await?;
        let route = self.route(&format!("/issues/comments/{comment_id}"));
        let _: serde_json::Value = self
            .execute(Method::Patch, &route, Some(&json!({ "body": body })))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_label_names_for_paths() {
        assert_eq!(encode_segment("good first issue"), "good%20first%20issue");
        assert_eq!(encode_segment("c++"), "c%2B%2B");
        assert_eq!(encode_segment("bug"), "bug");
    }

    #[test]
    fn routes_are_repository_scoped() {
        assert_eq!(
            repo_route("acme", "widgets", "/import/issues"),
            "/repos/acme/widgets/import/issues"
        );
        assert_eq!(
            repo_route("acme", "widgets", &format!("/labels/{}", encode_segment("needs info"))),
            "/repos/acme/widgets/labels/needs%20info"
        );
    }
}
