//! Milestone synchronization.
//!
//! Source milestones are matched against destination milestones by exact
//! title; missing ones are created. The resulting map is needed before any
//! issue can be imported.

mod error;

pub use error::MilestoneError;

use crate::gateway::{GitHubGateway, RemoteMilestone};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span, Instrument};

/// Destination milestone numbers keyed by source title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MilestoneMap {
    numbers: BTreeMap<String, u64>,
    /// How many titles already existed at the destination.
    pub existing: usize,
    /// How many titles were created.
    pub created: usize,
}

impl MilestoneMap {
    /// Looks up the destination number for a source title.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<u64> {
        self.numbers.get(title).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl FromIterator<(String, u64)> for MilestoneMap {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            numbers: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Ensures every required title exists as a destination milestone.
///
/// All listing pages are read before anything is created, so a title present
/// on any page is never duplicated. When several destination milestones share
/// a required title, the first one listed wins.
///
/// # Errors
///
/// Returns [`MilestoneError`] if listing or creating fails; both abort the
/// run since issues cannot be imported without their milestones.
pub async fn sync_milestones<G: GitHubGateway>(
    gateway: &G,
    required_titles: &[String],
) -> Result<MilestoneMap, MilestoneError> {
    let span = info_span!("sync_milestones", required = required_titles.len());

    async {
        info!("Synchronizing milestones");

        let existing = list_all_milestones(gateway).await?;
        let mut map = MilestoneMap::default();

        for milestone in &existing {
            if !required_titles.contains(&milestone.title) {
                debug!(title = %milestone.title, "Milestone not used");
                continue;
            }
            if map.numbers.contains_key(&milestone.title) {
                debug!(title = %milestone.title, number = milestone.number, "Ignoring duplicate milestone");
                continue;
            }
            debug!(title = %milestone.title, number = milestone.number, "Milestone found");
            map.numbers.insert(milestone.title.clone(), milestone.number);
            map.existing += 1;
        }

        for title in required_titles {
            if map.numbers.contains_key(title) {
                continue;
            }
            let created = gateway
                .create_milestone(title)
                .await
                .map_err(|source| MilestoneError::Create {
                    title: title.clone(),
                    source,
                })?;
            info!(title = %title, number = created.number, "Milestone created");
            map.numbers.insert(title.clone(), created.number);
            map.created += 1;
        }

        info!(existing = map.existing, created = map.created, "Milestones synchronized");
        Ok(map)
    }
    .instrument(span)
    .await
}

/// Reads every page of the milestone listing.
async fn list_all_milestones<G: GitHubGateway>(
    gateway: &G,
) -> Result<Vec<RemoteMilestone>, MilestoneError> {
    let mut milestones = Vec::new();
    let mut next: Option<String> = None;

    loop {
        let page = gateway
            .list_milestones(next.as_deref())
            .await
            .map_err(MilestoneError::List)?;
        milestones.extend(page.items);
        next = page.next;
        if next.is_none() {
            break;
        }
    }

    debug!(count = milestones.len(), "Listed milestones");
    Ok(milestones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;

    fn titles(titles: &[&str]) -> Vec<String> {
        titles.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn creates_missing_and_reuses_existing() {
        let gateway = InMemoryGateway::new().with_milestone("1.0").with_milestone("old");

        let map = sync_milestones(&gateway, &titles(&["1.0", "2.0"])).await.unwrap();

        assert_eq!(map.get("1.0"), Some(1));
        assert_eq!(map.get("2.0"), Some(3));
        assert_eq!(map.existing, 1);
        assert_eq!(map.created, 1);
        assert_eq!(gateway.milestones_created(), 1);
    }

    #[tokio::test]
    async fn finds_milestones_beyond_first_page() {
        let gateway = InMemoryGateway::new()
            .with_page_size(1)
            .with_milestone("a")
            .with_milestone("b")
            .with_milestone("c");

        let map = sync_milestones(&gateway, &titles(&["c"])).await.unwrap();

        assert_eq!(map.get("c"), Some(3));
        assert_eq!(gateway.milestones_created(), 0);
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let gateway = InMemoryGateway::new().with_page_size(2);
        let required = titles(&["1.0", "1.1", "2.0"]);

        let first = sync_milestones(&gateway, &required).await.unwrap();
        let second = sync_milestones(&gateway, &required).await.unwrap();

        assert_eq!(first.created, 3);
        assert_eq!(second.created, 0);
        assert_eq!(second.existing, 3);
        assert_eq!(first.get("1.1"), second.get("1.1"));
        assert_eq!(gateway.milestones_created(), 3);
    }

    #[tokio::test]
    async fn first_duplicate_title_wins() {
        let gateway = InMemoryGateway::new().with_milestone("dup").with_milestone("dup");

        let map = sync_milestones(&gateway, &titles(&["dup"])).await.unwrap();

        assert_eq!(map.get("dup"), Some(1));
        assert_eq!(map.existing, 1);
    }
}
