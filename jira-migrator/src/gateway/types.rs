//! Wire types exchanged with the destination.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A milestone that exists at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMilestone {
    pub number: u64,
    pub title: String,
}

/// A label that exists at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// An issue comment that exists at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
}

/// One page of a listing plus the link to the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Issue fields accepted by the import endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    pub title: String,
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<FixedOffset>>,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Comment fields accepted by the import endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    pub body: String,
}

/// Payload of one asynchronous issue import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub issue: ImportIssue,
    pub comments: Vec<ImportComment>,
}

/// State of an asynchronous issue import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    Pending,
    Imported,
    Failed,
    /// Any status string GitHub is not documented to return.
    Unknown(String),
}

impl ImportStatus {
    /// Parses the `status` field of an import job.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => Self::Pending,
            "imported" => Self::Imported,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// An asynchronous issue import job, as reported by the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: u64,
    pub status: String,
    /// API URL of the created issue, once imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    /// Validation errors, when the import failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl ImportJob {
    #[must_use]
    pub fn import_status(&self) -> ImportStatus {
        ImportStatus::parse(&self.status)
    }

    /// Returns the created issue's number, taken from the end of its URL.
    #[must_use]
    pub fn issue_number(&self) -> Option<u64> {
        self.issue_url
            .as_deref()?
            .trim_end_matches('/')
            .rsplit('/')
            .next()?
            .parse()
            .ok()
    }
}
