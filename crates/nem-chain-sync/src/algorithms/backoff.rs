//! # Retry Backoff
//!
//! Exponential delay between cycles after remote failures.

use std::time::Duration;

/// Caps the exponent so the shift cannot overflow.
const MAX_DOUBLINGS: u32 = 16;

/// Exponential backoff state.
#[derive(Clone, Debug)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl RetryBackoff {
    /// Create a backoff starting at `base` and capped at `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        let doublings = self.failures.min(MAX_DOUBLINGS);
        self.failures = self.failures.saturating_add(1);
        self.base
            .saturating_mul(1u32 << doublings)
            .min(self.max)
    }

    /// Consecutive failures so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Forget past failures after a successful cycle.
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
