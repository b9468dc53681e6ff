//! Polling and retry knobs.

use std::time::Duration;

/// Capped exponential backoff for transient query failures.
///
/// Retry `n` (counting from 0) waits `min(base_delay · 2ⁿ, max_delay)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first failed attempt of a round.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// How long and how often the confirmation page keeps asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Fixed wait between rounds while the order is pending or absent.
    pub poll_interval: Duration,
    /// Wall-clock budget measured from the first query.
    pub timeout: Duration,
    /// Upper bound on query rounds, independent of the clock.
    pub max_polls: u32,
    pub retry: RetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            max_polls: 15,
            retry: RetryPolicy::default(),
        }
    }
}
