//! Label synchronization.
//!
//! Every component, label and type name used by the source project must
//! exist as a destination label before issues referencing it are imported.

mod colour;
mod error;

pub use colour::{ColourSelector, PaletteColourSelector};
pub use error::LabelError;

use crate::gateway::GitHubGateway;
use tracing::{debug, info, info_span, Instrument};

/// Counts from a label synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSummary {
    /// Labels that already existed.
    pub existing: usize,
    /// Labels that were created.
    pub created: usize,
}

/// Ensures every named label exists, creating missing ones.
///
/// Only a "not found" answer leads to creation. Any other lookup failure
/// aborts, so an unreachable API never causes duplicate creation attempts.
///
/// # Errors
///
/// Returns [`LabelError`] if a lookup fails for another reason or creation
/// fails.
pub async fn sync_labels<'a, G, I>(
    gateway: &G,
    names: I,
    colours: &dyn ColourSelector,
) -> Result<LabelSummary, LabelError>
where
    G: GitHubGateway,
    I: IntoIterator<Item = &'a str>,
{
    let span = info_span!("sync_labels");

    async {
        info!("Synchronizing labels");
        let mut summary = LabelSummary::default();

        for name in names {
            match gateway.get_label(name).await {
                Ok(_) => {
                    debug!(label = name, "Skipping label that already exists");
                    summary.existing += 1;
                }
                Err(e) if e.is_not_found() => {
                    let colour = colours.colour_for(name);
                    info!(label = name, colour = %colour, "Creating label");
                    gateway
                        .create_label(name, &colour)
                        .await
                        .map_err(|source| LabelError::Create {
                            name: name.to_string(),
                            source,
                        })?;
                    summary.created += 1;
                }
                Err(source) => {
                    return Err(LabelError::Fetch {
                        name: name.to_string(),
                        source,
                    });
                }
            }
        }

        info!(
            existing = summary.existing,
            created = summary.created,
            "Labels synchronized"
        );
        Ok(summary)
    }
    .instrument(span)
    .await
}
