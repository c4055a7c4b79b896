//! Project snapshot produced by the extraction step.

use super::Issue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Occurrence counts keyed by name.
pub type Histogram = BTreeMap<String, u64>;

/// Everything the importer needs from a source project.
///
/// Built once and read-only afterwards, apart from the issues which the
/// import stage mutates in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Source project key, e.g. `PROJ`.
    pub name: String,

    /// Issues in import order.
    #[serde(default)]
    pub issues: Vec<Issue>,

    /// Milestone titles and how many issues use them.
    #[serde(default)]
    pub milestones: Histogram,

    #[serde(default)]
    pub components: Histogram,

    #[serde(default)]
    pub labels: Histogram,

    #[serde(default)]
    pub types: Histogram,
}

impl ProjectSnapshot {
    /// Returns the milestone titles that must exist at the destination.
    #[must_use]
    pub fn milestone_titles(&self) -> Vec<String> {
        self.milestones.keys().cloned().collect()
    }

    /// Returns the union of component, label and type names.
    #[must_use]
    pub fn all_labels(&self) -> BTreeSet<String> {
        self.components
            .keys()
            .chain(self.labels.keys())
            .chain(self.types.keys())
            .cloned()
            .collect()
    }

    /// Returns the source keys of all issues, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.key.as_str())
    }
}
