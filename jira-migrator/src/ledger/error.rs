//! Import ledger error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the import ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to read or write the ledger file.
    #[error("Failed to access ledger '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize the ledger.
    #[error("Failed to parse ledger '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The ledger belongs to another source project.
    #[error("Ledger '{path}' belongs to project '{found}', not '{expected}'")]
    ProjectMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// An issue before the resume offset was never imported.
    #[error("Cannot resume: issue #{index} '{key}' would be skipped but was never imported")]
    ResumeMismatch { index: usize, key: String },
}
