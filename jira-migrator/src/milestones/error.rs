//! Milestone synchronization error types.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur while synchronizing milestones.
#[derive(Debug, Error)]
pub enum MilestoneError {
    /// Listing existing milestones failed.
    #[error("Failed to list milestones: {0}")]
    List(#[source] GatewayError),

    /// Creating a milestone failed.
    #[error("Failed to create milestone '{title}': {source}")]
    Create {
        title: String,
        #[source]
        source: GatewayError,
    },
}
