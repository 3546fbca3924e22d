use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

/// Client-side request budget, e.g. the free tier's 5 calls per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestQuota {
    pub limit: u32,
    pub window: Duration,
}

impl RequestQuota {
    pub const fn per_minute(limit: u32) -> Self {
        Self {
            limit,
            window: Duration::from_secs(60),
        }
    }

    fn to_governor(self) -> Quota {
        let burst = NonZeroU32::new(self.limit.max(1)).unwrap_or(NonZeroU32::MIN);
        let seconds_per_cell = (self.window.as_secs_f64() / f64::from(burst.get())).max(0.001);

        Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared limiter that delays outgoing requests once the quota is spent.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
}

impl RequestThrottle {
    pub fn new(quota: RequestQuota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota.to_governor())),
        }
    }

    /// Takes one cell without waiting. Returns `false` when the budget is spent.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits until one cell of the budget is available.
    pub async fn acquire(&self) {
        if self.try_acquire() {
            return;
        }

        tracing::debug!("request quota spent; waiting for the next cell");
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}
