//! Polling and failure policies.

use serde::Deserialize;
use std::time::Duration;

/// How the delay between status polls evolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Same delay every time.
    #[default]
    Fixed,
    /// Delay doubles after every poll, up to the maximum interval.
    Exponential,
}

/// Bounds on waiting for an import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before the second poll.
    pub interval: Duration,
    /// Polls allowed before giving up on a job.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 100,
            backoff: Backoff::Fixed,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    /// Delay after poll number `attempt` (starting at 1).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential => self
                .interval
                .saturating_mul(1 << attempt.saturating_sub(1).min(16)),
        };
        delay.min(self.max_interval)
    }
}

/// What to do when a single issue cannot be imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the stage at the first failed issue.
    #[default]
    Halt,
    /// Record the failure and carry on with the next issue.
    Continue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(3));
        assert_eq!(policy.delay(50), Duration::from_secs(3));
    }

    #[test]
    fn exponential_backoff_doubles_up_to_cap() {
        let policy = PollPolicy {
            backoff: Backoff::Exponential,
            max_interval: Duration::from_secs(20),
            ..PollPolicy::default()
        };

        assert_eq!(policy.delay(1), Duration::from_secs(3));
        assert_eq!(policy.delay(2), Duration::from_secs(6));
        assert_eq!(policy.delay(3), Duration::from_secs(12));
        assert_eq!(policy.delay(4), Duration::from_secs(20));
        assert_eq!(policy.delay(40), Duration::from_secs(20));
    }
}
