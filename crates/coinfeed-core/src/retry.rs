//! Retry policy for a single unit of work.

use std::time::Duration;

use crate::config::IngestConfig;

/// Linear backoff with a fixed attempt budget.
///
/// `max_retries` counts every attempt, the first one included. Attempt `n`
/// (0-based) that fails transiently waits `backoff_step * (n + 1)` before the
/// next one; the last attempt never waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            backoff_step: Duration::from_millis(crate::config::DEFAULT_RATE_LIMIT_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn linear(max_retries: u32, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::linear(config.max_retries, config.backoff_step())
    }

    /// Total attempts; never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt + 1 >= self.attempts()
    }

    /// Sleep after a failed `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt.saturating_add(1))
    }
}
