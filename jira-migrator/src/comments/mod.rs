//! Placeholder post-processing.
//!
//! Once every issue exists at the destination, all repository comments are
//! scanned page by page and placeholder tokens are replaced with final
//! destination references. Comments are independent of each other, so the
//! updates of a page run concurrently.

mod error;

pub use error::PostProcessError;

use crate::gateway::GitHubGateway;
use crate::references::{contains_placeholder, PlaceholderResolver};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Counts from a post-processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostProcessReport {
    /// Listing pages read.
    pub pages: usize,
    /// Comments inspected.
    pub scanned: usize,
    /// Comments rewritten.
    pub patched: usize,
    /// Placeholder tokens replaced.
    pub replaced: usize,
    /// Tokens whose source issue had no recorded destination number.
    pub unmapped: usize,
}

/// Rewrites placeholder tokens in every comment of the repository.
///
/// Follows the listing's `next` link until there is none. Comments without a
/// placeholder are never written, and each comment is written at most once.
///
/// # Errors
///
/// Returns [`PostProcessError`] if a page cannot be listed or a comment
/// cannot be updated. Updates already sent for the current page are kept.
pub async fn resolve_all<G: GitHubGateway>(
    gateway: &G,
    resolver: &PlaceholderResolver,
    concurrency: usize,
) -> Result<PostProcessReport, PostProcessError> {
    let span = info_span!("post_process", mapped_issues = resolver.ids().len());

    async {
        info!("Post-processing comments");
        let mut report = PostProcessReport::default();
        let mut rewritten = HashSet::new();
        let mut next: Option<String> = None;

        loop {
            let page = gateway
                .list_comments(next.as_deref())
                .await
                .map_err(PostProcessError::List)?;
            report.pages += 1;
            debug!(page = report.pages, comments = page.items.len(), "Listed comments");

            let mut updates = Vec::new();
            for comment in page.items {
                report.scanned += 1;
                if !contains_placeholder(&comment.body) || rewritten.contains(&comment.id) {
                    continue;
                }
                let resolution = resolver.resolve(&comment.body);
                if resolution.text == comment.body {
                    continue;
                }
                report.replaced += resolution.replaced;
                report.unmapped += resolution.unmapped;
                rewritten.insert(comment.id);
                updates.push((comment.id, resolution.text));
            }

            let results: Vec<Result<u64, PostProcessError>> = stream::iter(updates)
                .map(|(comment_id, body)| async move {
                    debug!(comment_id, "Updating comment");
                    gateway
                        .update_comment(comment_id, &body)
                        .await
                        .map(|()| comment_id)
                        .map_err(|source| PostProcessError::Update { comment_id, source })
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

            for result in results {
                result?;
                report.patched += 1;
            }

            next = page.next;
            if next.is_none() {
                break;
            }
        }

        if report.unmapped > 0 {
            warn!(
                unmapped = report.unmapped,
                "Some references had no recorded destination issue and kept their source number"
            );
        }
        info!(
            pages = report.pages,
            scanned = report.scanned,
            patched = report.patched,
            "Post-processing finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
