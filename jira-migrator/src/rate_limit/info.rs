//! Rate limit information.

/// Rate limit information for a specific resource.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Seconds until the window resets, or zero if it already has.
    #[must_use]
    pub fn seconds_until_reset(&self, now: u64) -> u64 {
        self.reset.saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_time_until_reset() {
        let info = RateLimitInfo {
            remaining: 10,
            reset: 1_000,
            limit: 5_000,
        };

        assert_eq!(info.seconds_until_reset(400), 600);
        assert_eq!(info.seconds_until_reset(2_000), 0);
    }
}
