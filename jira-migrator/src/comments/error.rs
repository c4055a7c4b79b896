//! Post-processing error types.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur while rewriting comment placeholders.
#[derive(Debug, Error)]
pub enum PostProcessError {
    /// Listing a page of comments failed.
    #[error("Failed to list comments: {0}")]
    List(#[source] GatewayError),

    /// Updating a comment failed.
    #[error("Failed to update comment {comment_id}: {source}")]
    Update {
        comment_id: u64,
        #[source]
        source: GatewayError,
    },
}
