//! Retry policy for the polling tier.

use std::time::Duration;

/// Configuration for the status-poll loop and the image-load guard.
///
/// One policy object replaces the scattered timers the polling behavior would
/// otherwise accrete; the loop that consumes it lives in [`crate::card`].
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of status-poll attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between poll attempts.
    pub backoff: Duration,
    /// How long an image-load attempt may run before it counts as failed.
    pub load_guard: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff: Duration::from_secs(2),
            load_guard: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    /// Set the poll attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay between poll attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the image-load timeout guard.
    pub fn with_load_guard(mut self, load_guard: Duration) -> Self {
        self.load_guard = load_guard;
        self
    }
}
