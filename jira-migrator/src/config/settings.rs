//! Migration settings deserialization.

use crate::issues::{Backoff, FailurePolicy, PollPolicy};
use crate::references::DEFAULT_DESTINATION_MARKER;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Parsed contents of a `migrator.toml` file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    /// URL prefix of issue pages on the source tracker.
    pub source_browse_url: String,

    /// Prefix of destination issue references in rewritten comments.
    pub destination_marker: String,

    /// Delay between import status polls.
    pub poll_interval_secs: u64,

    /// Polls allowed per import job.
    pub max_poll_attempts: u32,

    pub poll_backoff: Backoff,

    /// Upper bound on the delay between polls.
    pub max_poll_interval_secs: u64,

    /// Overall time budget of the issue stage.
    pub run_timeout_secs: Option<u64>,

    /// Concurrent comment updates during post-processing.
    pub concurrency: usize,

    pub failure_policy: FailurePolicy,

    /// Explicit colours for new labels, keyed by label name.
    pub label_colours: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_browse_url: "https://java.net/jira/browse/".to_string(),
            destination_marker: DEFAULT_DESTINATION_MARKER.to_string(),
            poll_interval_secs: 3,
            max_poll_attempts: 100,
            poll_backoff: Backoff::Fixed,
            max_poll_interval_secs: 60,
            run_timeout_secs: None,
            concurrency: 5,
            failure_policy: FailurePolicy::Halt,
            label_colours: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Checks values serde cannot, returning a description of the first problem.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.destination_marker.is_empty() {
            return Err("destination-marker must not be empty".to_string());
        }
        if self.poll_interval_secs == 0 {
            return Err("poll-interval-secs must be greater than zero".to_string());
        }
        if self.max_poll_attempts == 0 {
            return Err("max-poll-attempts must be greater than zero".to_string());
        }
        if self.max_poll_interval_secs < self.poll_interval_secs {
            return Err("max-poll-interval-secs must not be below poll-interval-secs".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than zero".to_string());
        }
        for (label, colour) in &self.label_colours {
            if colour.len() != 6 || !colour.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!(
                    "label-colours.{label} must be six hex digits, got '{colour}'"
                ));
            }
        }
        Ok(())
    }

    /// Returns the polling bounds described by these settings.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_poll_attempts,
            backoff: self.poll_backoff,
            max_interval: Duration::from_secs(self.max_poll_interval_secs),
        }
    }

    /// Returns the issue stage time budget, if any.
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}
