//! Bounded retry policy for version conflicts.

use std::time::Duration;

use fundline_shared::TransferConfig;

/// How many times a conflicted transfer is attempted and how long to wait
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Attempts per transfer unless configured otherwise.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Sleep between attempts unless configured otherwise.
    pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(50);

    /// Creates a policy. `max_attempts` of zero is treated as one.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            backoff,
        }
    }

    /// Total attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed sleep between a conflicted attempt and the next.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Returns true if `attempt` (1-based) is the last one allowed.
    #[must_use]
    pub const fn is_final(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BACKOFF)
    }
}

impl From<&TransferConfig> for RetryPolicy {
    fn from(config: &TransferConfig) -> Self {
        Self::new(config.max_attempts, config.backoff())
    }
}
