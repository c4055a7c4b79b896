//! Export snapshot error types.

use thiserror::Error;

/// Errors that can occur while loading an export snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to read the snapshot file.
    #[error("Failed to read export '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the snapshot JSON.
    #[error("Failed to parse export '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot violates an invariant the importer relies on.
    #[error("Invalid export '{path}': {message}")]
    ValidationError { path: String, message: String },
}
