//! Gateway error types.

use thiserror::Error;

/// Errors returned by a [`GitHubGateway`](super::GitHubGateway).
///
/// Missing resources are reported separately from every other failure so
/// callers can tell "must create" apart from "could not ask".
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The resource does not exist (HTTP 404).
    #[error("Not found: {route}")]
    NotFound { route: String },

    /// GitHub answered with a non-success status other than 404.
    #[error("GitHub returned {status} for {route}: {message}")]
    Status {
        route: String,
        status: u16,
        message: String,
    },

    /// The request did not produce a response.
    #[error("GitHub request to {route} failed: {source}")]
    Transport {
        route: String,
        #[source]
        source: octocrab::Error,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response from {route}: {message}")]
    Decode { route: String, message: String },
}

impl GatewayError {
    /// Classifies an octocrab error raised for `route`.
    pub fn from_octocrab(route: &str, error: octocrab::Error) -> Self {
        let route = route.to_string();
        match error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if status == 404 {
                    Self::NotFound { route }
                } else {
                    Self::Status {
                        route,
                        status,
                        message: source.message,
                    }
                }
            }
            octocrab::Error::Serde { source, .. } => Self::Decode {
                route,
                message: source.to_string(),
            },
            octocrab::Error::Json { source, .. } => Self::Decode {
                route,
                message: source.to_string(),
            },
            other => Self::Transport {
                route,
                source: other,
            },
        }
    }

    /// Returns true if the failure means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the HTTP status, when GitHub answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}
