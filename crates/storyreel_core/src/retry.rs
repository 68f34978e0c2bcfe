//! Bounded retry policies.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use storyreel_error::ConfigError;

/// A fixed number of attempts separated by a fixed delay.
///
/// Every remote interaction in the pipeline is bounded by one of these, so the
/// worst-case wall-clock time of any step is `max_attempts * delay` plus the
/// time of the attempts themselves.
///
/// ```
/// use std::time::Duration;
/// use storyreel_core::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(5));
/// assert_eq!(policy.delays().count(), 2);
/// assert_eq!(policy.ceiling(), Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// Image submission: three attempts five seconds apart.
    pub const SUBMISSION: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(5));
    /// Image polling: eighteen polls seven seconds apart.
    pub const POLLING: RetryPolicy = RetryPolicy::new(18, Duration::from_secs(7));
    /// Portrait prompt variants: four seconds between variants.
    pub const PORTRAIT: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(4));

    /// Create a policy.
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Delays to sleep before each retry; one fewer than the attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        std::iter::repeat_n(self.delay(), self.max_attempts.saturating_sub(1) as usize)
    }

    /// Upper bound on the time spent waiting across all attempts.
    pub fn ceiling(&self) -> Duration {
        self.delay() * self.max_attempts
    }

    /// Reject a policy that would never attempt anything.
    #[track_caller]
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                format!("{}.max_attempts", field),
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
