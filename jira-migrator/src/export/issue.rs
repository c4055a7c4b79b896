//! Canonical issue, comment and relationship records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of link between two source issues.
///
/// Declaration order is the order in which relationships are flattened into
/// comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    Duplicates,
    IsDuplicatedBy,
    IsRelatedTo,
    DependsOn,
    Blocks,
}

impl RelationshipKind {
    /// All kinds, in flattening order.
    pub const ALL: [Self; 5] = [
        Self::Duplicates,
        Self::IsDuplicatedBy,
        Self::IsRelatedTo,
        Self::DependsOn,
        Self::Blocks,
    ];

    /// Human readable prefix of the synthetic comment for this kind.
    #[must_use]
    pub fn comment_prefix(self) -> &'static str {
        match self {
            Self::Duplicates => "Duplicates: ",
            Self::IsDuplicatedBy => "Is duplicated by: ",
            Self::IsRelatedTo => "Is related to: ",
            Self::DependsOn => "Depends on: ",
            Self::Blocks => "Blocks: ",
        }
    }
}

/// Related source keys, grouped by kind.
pub type Relationships = BTreeMap<RelationshipKind, Vec<String>>;

/// Milestone reference carried by an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MilestoneRef {
    /// Source milestone title, as exported.
    Title(String),
    /// Destination milestone number, once synchronized.
    Resolved(u64),
}

/// A comment attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Creation time; synthetic comments carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,

    /// Comment text.
    pub body: String,

    /// Original author, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Comment {
    /// Creates a comment with no timestamp or author.
    #[must_use]
    pub fn synthetic(body: String) -> Self {
        Self {
            created_at: None,
            body,
            author: None,
        }
    }
}

/// A source issue as produced by the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IssueRecord", into = "IssueRecord")]
pub struct Issue {
    /// Source key, e.g. `PROJ-42`.
    pub key: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub closed_at: Option<DateTime<FixedOffset>>,
    pub closed: bool,
    pub milestone: Option<MilestoneRef>,
    pub labels: Vec<String>,
    pub comments: Vec<Comment>,
    /// Links to other source issues. Emptied once flattened into comments.
    pub relationships: Relationships,
    /// Destination issue number, once imported.
    pub destination_number: Option<u64>,
}

/// Serialized form of [`Issue`]. Fields the importer does not know are
/// ignored.
#[derive(Debug, Serialize, Deserialize)]
struct IssueRecord {
    key: String,
    title: String,
    #[serde(default)]
    body: String,
    created_at: DateTime<FixedOffset>,
    updated_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    closed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    closed: bool,
    #[serde(default, alias = "milestone_name", skip_serializing_if = "Option::is_none")]
    milestone: Option<MilestoneRef>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    duplicates: Vec<String>,
    #[serde(default, rename = "is-duplicated-by", skip_serializing_if = "Vec::is_empty")]
    is_duplicated_by: Vec<String>,
    #[serde(default, rename = "is-related-to", skip_serializing_if = "Vec::is_empty")]
    is_related_to: Vec<String>,
    #[serde(default, rename = "depends-on", skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination_number: Option<u64>,
}

impl From<IssueRecord> for Issue {
    fn from(record: IssueRecord) -> Self {
        let relationships = [
            (RelationshipKind::Duplicates, record.duplicates),
            (RelationshipKind::IsDuplicatedBy, record.is_duplicated_by),
            (RelationshipKind::IsRelatedTo, record.is_related_to),
            (RelationshipKind::DependsOn, record.depends_on),
            (RelationshipKind::Blocks, record.blocks),
        ]
        .into_iter()
        .filter(|(_, keys)| !keys.is_empty())
        .collect();

        Self {
            key: record.key,
            title: record.title,
            body: record.body,
            created_at: record.created_at,
            updated_at: record.updated_at,
            closed_at: record.closed_at,
            closed: record.closed,
            milestone: record.milestone,
            labels: record.labels,
            comments: record.comments,
            relationships,
            destination_number: record.destination_number,
        }
    }
}

impl From<Issue> for IssueRecord {
    fn from(issue: Issue) -> Self {
        let mut relationships = issue.relationships;
        let mut take = |kind| relationships.remove(&kind).unwrap_or_default();

        Self {
            duplicates: take(RelationshipKind::Duplicates),
            is_duplicated_by: take(RelationshipKind::IsDuplicatedBy),
            is_related_to: take(RelationshipKind::IsRelatedTo),
            depends_on: take(RelationshipKind::DependsOn),
            blocks: take(RelationshipKind::Blocks),
            key: issue.key,
            title: issue.title,
            body: issue.body,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            closed: issue.closed,
            milestone: issue.milestone,
            labels: issue.labels,
            comments: issue.comments,
            destination_number: issue.destination_number,
        }
    }
}

impl Issue {
    /// Returns the numeric suffix of the source key (`PROJ-42` -> `42`).
    #[must_use]
    pub fn key_number(&self) -> Option<u64> {
        key_number(&self.key)
    }

    /// Returns the related keys of one kind.
    #[must_use]
    pub fn related(&self, kind: RelationshipKind) -> &[String] {
        self.relationships.get(&kind).map_or(&[], Vec::as_slice)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.title)
    }
}

/// Returns the numeric suffix of a source key.
#[must_use]
pub fn key_number(key: &str) -> Option<u64> {
    key.rsplit_once('-')
        .and_then(|(_, number)| number.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relationship_lists_by_kind() {
        let json = r#"{
            "key": "PROJ-1",
            "title": "Crash on start",
            "created_at": "2015-01-02T03:04:05+00:00",
            "updated_at": "2015-01-03T03:04:05+00:00",
            "milestone": "1.0",
            "depends-on": ["PROJ-42"],
            "blocks": ["PROJ-7", "PROJ-8"]
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();

        assert_eq!(issue.milestone, Some(MilestoneRef::Title("1.0".to_string())));
        assert_eq!(issue.related(RelationshipKind::DependsOn), ["PROJ-42"]);
        assert_eq!(issue.related(RelationshipKind::Blocks), ["PROJ-7", "PROJ-8"]);
        assert!(issue.related(RelationshipKind::Duplicates).is_empty());
        assert!(!issue.closed);
    }

    #[test]
    fn accepts_extractor_milestone_name_and_unknown_fields() {
        let json = r#"{
            "key": "PROJ-2",
            "title": "Tokenizer drops input",
            "created_at": "2015-01-02T03:04:05+00:00",
            "updated_at": "2015-01-03T03:04:05+00:00",
            "milestone_name": "1.1",
            "assignee": "jdoe",
            "is-related-to": ["PROJ-1"]
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();

        assert_eq!(issue.milestone, Some(MilestoneRef::Title("1.1".to_string())));
        assert_eq!(issue.related(RelationshipKind::IsRelatedTo), ["PROJ-1"]);
        assert_eq!(issue.relationships.len(), 1);
    }

    #[test]
    fn serializes_relationships_under_their_kind_names() {
        let json = r#"{
            "key": "PROJ-3",
            "title": "Limits",
            "created_at": "2015-01-02T03:04:05+00:00",
            "updated_at": "2015-01-03T03:04:05+00:00",
            "is-duplicated-by": ["PROJ-9"]
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();

        let value = serde_json::to_value(&issue).unwrap();

        assert_eq!(value["is-duplicated-by"], serde_json::json!(["PROJ-9"]));
        assert!(value.get("blocks").is_none());
    }

    #[test]
    fn extracts_key_number() {
        assert_eq!(key_number("PROJ-42"), Some(42));
        assert_eq!(key_number("MY-PROJ-7"), Some(7));
        assert_eq!(key_number("PROJ"), None);
        assert_eq!(key_number("PROJ-x"), None);
    }

    #[test]
    fn kinds_are_ordered_for_flattening() {
        let mut kinds = RelationshipKind::ALL;
        kinds.sort();
        assert_eq!(kinds, RelationshipKind::ALL);
        assert_eq!(RelationshipKind::IsDuplicatedBy.comment_prefix(), "Is duplicated by: ");
    }
}
