//! Label synchronization error types.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur while synchronizing labels.
#[derive(Debug, Error)]
pub enum LabelError {
    /// Looking up a label failed for a reason other than it being absent.
    #[error("Failed to look up label '{name}': {source}")]
    Fetch {
        name: String,
        #[source]
        source: GatewayError,
    },

    /// Creating a label failed.
    #[error("Failed to create label '{name}': {source}")]
    Create {
        name: String,
        #[source]
        source: GatewayError,
    },
}
