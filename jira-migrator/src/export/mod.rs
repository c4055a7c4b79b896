//! Loading the extracted project snapshot.
//!
//! The extraction step (document parsing, entity decoding, link rewriting)
//! happens upstream; this module only reads its JSON output and checks the
//! invariants the importer depends on.

mod error;
mod issue;
mod snapshot;

pub use error::ExportError;
pub use issue::{key_number, Comment, Issue, MilestoneRef, RelationshipKind, Relationships};
pub use snapshot::{Histogram, ProjectSnapshot};

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Loads and validates a snapshot file.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be read or parsed, or if the
/// project name is empty or an issue key is empty or repeated.
pub fn load_snapshot(path: &Path) -> Result<ProjectSnapshot, ExportError> {
    info!(path = %path.display(), "Loading export snapshot");

    let contents = std::fs::read_to_string(path).map_err(|e| ExportError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let snapshot: ProjectSnapshot =
        serde_json::from_str(&contents).map_err(|e| ExportError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate(&snapshot).map_err(|message| ExportError::ValidationError {
        path: path.display().to_string(),
        message,
    })?;

    info!(
        project = %snapshot.name,
        issues = snapshot.issues.len(),
        milestones = snapshot.milestones.len(),
        labels = snapshot.all_labels().len(),
        "Loaded export snapshot"
    );
    Ok(snapshot)
}

fn validate(snapshot: &ProjectSnapshot) -> Result<(), String> {
    if snapshot.name.trim().is_empty() {
        return Err("project name is empty".to_string());
    }

    let mut seen = HashSet::new();
    for (index, key) in snapshot.keys().enumerate() {
        if key.trim().is_empty() {
            return Err(format!("issue #{index} has an empty key"));
        }
        if !seen.insert(key) {
            return Err(format!("issue key '{key}' appears more than once"));
        }
    }

    debug!(unique_keys = seen.len(), "Snapshot keys validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ISSUE_A: &str = r#"{"key": "PROJ-1", "title": "A",
        "created_at": "2015-01-02T03:04:05+00:00", "updated_at": "2015-01-02T03:04:05+00:00"}"#;

    fn write(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("export.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn can_load_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            &format!(r#"{{"name": "PROJ", "issues": [{ISSUE_A}], "milestones": {{"1.0": 1}}}}"#),
        );

        let snapshot = load_snapshot(&path).unwrap();

        assert_eq!(snapshot.name, "PROJ");
        assert_eq!(snapshot.issues.len(), 1);
        assert_eq!(snapshot.milestone_titles(), ["1.0"]);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            &format!(r#"{{"name": "PROJ", "issues": [{ISSUE_A}, {ISSUE_A}]}}"#),
        );

        let result = load_snapshot(&path);
        assert!(matches!(result, Err(ExportError::ValidationError { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = load_snapshot(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(ExportError::IoError { .. })));
    }
}
