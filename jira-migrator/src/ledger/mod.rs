//! Durable record of imported issues.
//!
//! The ledger lists, in import order, each source key and the destination
//! number it received. The issue stage checks resume offsets against it and
//! never resubmits a recorded issue; the post-processing stage builds its id
//! map from it. Every entry is written to disk before the next issue is
//! submitted.

mod error;

pub use error::LedgerError;

use crate::export::key_number;
use crate::references::IdMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// One imported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Source key, e.g. `PROJ-42`.
    pub key: String,
    /// Destination issue number.
    pub number: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    project: String,
    #[serde(default)]
    entries: Vec<LedgerEntry>,
}

/// Import ledger, optionally backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ImportLedger {
    path: Option<PathBuf>,
    file: LedgerFile,
    /// Keys of `file.entries`.
    keys: HashSet<String>,
}

impl ImportLedger {
    fn from_file(path: Option<PathBuf>, file: LedgerFile) -> Self {
        let keys = file.entries.iter().map(|entry| entry.key.clone()).collect();
        Self { path, file, keys }
    }

    fn empty(path: Option<PathBuf>, project: &str) -> Self {
        Self::from_file(
            path,
            LedgerFile {
                project: project.to_string(),
                entries: Vec::new(),
            },
        )
    }

    /// Creates a ledger that is never written to disk.
    #[must_use]
    pub fn in_memory(project: &str) -> Self {
        Self::empty(None, project)
    }

    /// Opens the ledger at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if an existing file cannot be read, or belongs
    /// to another project.
    pub fn open(path: &Path, project: &str) -> Result<Self, LedgerError> {
        if !path.exists() {
            debug!(path = %path.display(), "Starting new ledger");
            return Ok(Self::empty(Some(path.to_path_buf()), project));
        }

        let ledger = Self::load(path)?;
        if ledger.file.project != project {
            return Err(LedgerError::ProjectMismatch {
                path: path.display().to_string(),
                expected: project.to_string(),
                found: ledger.file.project,
            });
        }
        Ok(ledger)
    }

    /// Loads an existing ledger file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: LedgerFile =
            serde_json::from_str(&contents).map_err(|e| LedgerError::JsonError {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!(path = %path.display(), entries = file.entries.len(), "Loaded ledger");
        Ok(Self::from_file(Some(path.to_path_buf()), file))
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.file.project
    }

    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.file.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    /// Returns true if the source key was imported.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Checks that every issue before `offset` was recorded as imported.
    ///
    /// An empty ledger cannot vouch for anything and is accepted with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ResumeMismatch`] for the first skipped issue the
    /// ledger does not know.
    pub fn verify_resume<'a>(
        &self,
        offset: usize,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), LedgerError> {
        if offset == 0 {
            return Ok(());
        }
        if self.is_empty() {
            warn!(
                offset,
                "Ledger is empty; cannot verify the issues skipped by the resume offset"
            );
            return Ok(());
        }

        for (index, key) in keys.into_iter().take(offset).enumerate() {
            if !self.keys.contains(key) {
                return Err(LedgerError::ResumeMismatch {
                    index,
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Appends an imported issue and writes the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the ledger cannot be written.
    pub fn record(&mut self, key: &str, number: u64) -> Result<(), LedgerError> {
        self.keys.insert(key.to_string());
        self.file.entries.push(LedgerEntry {
            key: key.to_string(),
            number,
        });
        self.persist()
    }

    /// Builds the source number to destination number map.
    #[must_use]
    pub fn id_map(&self) -> IdMap {
        self.file
            .entries
            .iter()
            .filter_map(|entry| Some((key_number(&entry.key)?, entry.number)))
            .collect()
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_error = |source| LedgerError::IoError {
            path: path.display().to_string(),
            source,
        };

        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        let json = serde_json::to_vec_pretty(&self.file).map_err(|e| LedgerError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;
        temp.write_all(&json).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.json");

        let mut ledger = ImportLedger::open(&path, "PROJ").unwrap();
        ledger.record("PROJ-1", 10).unwrap();
        ledger.record("PROJ-2", 11).unwrap();

        let reopened = ImportLedger::open(&path, "PROJ").unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[1].number, 11);
        assert_eq!(reopened.id_map().get(2), Some(11));
    }

    #[test]
    fn rejects_other_project() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.json");
        ImportLedger::open(&path, "PROJ").unwrap().record("PROJ-1", 1).unwrap();

        let result = ImportLedger::open(&path, "OTHER");
        assert!(matches!(result, Err(LedgerError::ProjectMismatch { .. })));
    }

    #[test]
    fn resume_detects_reordered_issues() {
        let mut ledger = ImportLedger::in_memory("PROJ");
        ledger.record("PROJ-1", 1).unwrap();
        ledger.record("PROJ-2", 2).unwrap();

        let result = ledger.verify_resume(2, ["PROJ-1", "PROJ-3", "PROJ-2"]);
        assert!(matches!(
            result,
            Err(LedgerError::ResumeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn resume_accepts_recorded_prefix() {
        let mut ledger = ImportLedger::in_memory("PROJ");
        ledger.record("PROJ-2", 2).unwrap();
        ledger.record("PROJ-1", 1).unwrap();

        assert!(ledger.verify_resume(2, ["PROJ-1", "PROJ-2", "PROJ-3"]).is_ok());
        assert!(ledger.contains("PROJ-2"));
        assert!(!ledger.contains("PROJ-3"));
    }

    #[test]
    fn loaded_entries_are_indexed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.json");
        let mut ledger = ImportLedger::open(&path, "PROJ").unwrap();
        for n in 1..=100 {
            ledger.record(&format!("PROJ-{n}"), n + 1000).unwrap();
        }

        let loaded = ImportLedger::load(&path).unwrap();

        assert!(loaded.contains("PROJ-1"));
        assert!(loaded.contains("PROJ-100"));
        assert!(!loaded.contains("PROJ-101"));
        let keys = (1..=100).map(|n| format!("PROJ-{n}")).collect::<Vec<_>>();
        assert!(loaded.verify_resume(100, keys.iter().map(String::as_str)).is_ok());
    }
}
