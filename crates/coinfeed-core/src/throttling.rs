use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::Quota;
use tokio::sync::Mutex;
use tokio::time::Instant;

type QuotaLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Enforces a minimum spacing between upstream calls.
///
/// `acquire` returns only once `delay` has passed since the previous `acquire`
/// returned. Callers are served in lock order. Dropping an `acquire` future
/// mid-wait leaves the recorded time untouched.
///
/// An optional per-minute ceiling can be layered underneath for providers that
/// publish a global quota independent of the spacing.
#[derive(Clone)]
pub struct RateLimiter {
    delay: Duration,
    last_return: Arc<Mutex<Option<Instant>>>,
    ceiling: Option<Arc<QuotaLimiter>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_return: Arc::new(Mutex::new(None)),
            ceiling: None,
        }
    }

    /// Adds a calls-per-minute ceiling on top of the spacing.
    pub fn with_ceiling_per_minute(mut self, calls_per_minute: u32) -> Self {
        self.ceiling = Some(Arc::new(QuotaLimiter::direct(quota_per_minute(
            calls_per_minute,
        ))));
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the spacing (and ceiling, if any) to allow the next call.
    pub async fn acquire(&self) {
        let mut last_return = self.last_return.lock().await;

        if let Some(previous) = *last_return {
            tokio::time::sleep_until(previous + self.delay).await;
        }
        if let Some(ceiling) = &self.ceiling {
            ceiling.until_ready().await;
        }

        *last_return = Some(Instant::now());
    }
}

fn quota_per_minute(calls_per_minute: u32) -> Quota {
    let safe_limit = NonZeroU32::new(calls_per_minute.max(1)).unwrap_or(NonZeroU32::MIN);
    Quota::per_minute(safe_limit).allow_burst(NonZeroU32::MIN)
}
