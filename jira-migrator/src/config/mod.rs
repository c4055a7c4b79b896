//! Settings loading.
//!
//! Tunables that rarely change between runs live in a `migrator.toml` file;
//! per-run choices (stage, offset, credentials) come from the command line.
//!
//! ```toml
//! source-browse-url = "https://java.net/jira/browse/"
//! destination-marker = "GH-"
//! poll-interval-secs = 3
//! max-poll-attempts = 100
//! poll-backoff = "exponential"
//! failure-policy = "continue"
//!
//! [label-colours]
//! bug = "d73a4a"
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::Settings;

use std::path::Path;
use tracing::{debug, info};

/// Loads and validates a settings file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable, not valid TOML
/// or holds invalid values.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    info!(path = %path.display(), "Loading settings");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let settings: Settings = toml::from_str(&contents).map_err(|e| ConfigError::TomlError {
        path: path.display().to_string(),
        source: e,
    })?;

    settings
        .check()
        .map_err(|message| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        })?;

    debug!(?settings, "Loaded settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{Backoff, FailurePolicy};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("migrator.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(&temp, "");

        let settings = load_settings(&path).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_policy().interval, Duration::from_secs(3));
        assert_eq!(settings.destination_marker, "GH-");
    }

    #[test]
    fn can_override_values() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(
            &temp,
            r##"
destination-marker = "#"
poll-backoff = "exponential"
failure-policy = "continue"
run-timeout-secs = 600

[label-colours]
bug = "d73a4a"
"##,
        );

        let settings = load_settings(&path).unwrap();

        assert_eq!(settings.destination_marker, "#");
        assert_eq!(settings.poll_backoff, Backoff::Exponential);
        assert_eq!(settings.failure_policy, FailurePolicy::Continue);
        assert_eq!(settings.run_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(settings.label_colours["bug"], "d73a4a");
    }

    #[test]
    fn rejects_invalid_colour() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(&temp, "[label-colours]\nbug = \"red\"\n");

        let result = load_settings(&path);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(&temp, "poll-intervall-secs = 3\n");

        let result = load_settings(&path);
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = TempDir::new().unwrap();

        let result = load_settings(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
