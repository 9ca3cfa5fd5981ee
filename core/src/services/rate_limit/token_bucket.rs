//! Lock-free token bucket (GCRA)
//!
//! The whole bucket is one atomic "theoretical arrival time" (TAT) in
//! nanoseconds since the bucket was created. Admitting a request pushes the
//! TAT forward by one refill interval; a request is refused when that would
//! put the TAT more than `burst` intervals ahead of now.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tg_shared::config::RateLimitConfig;

/// Shared bucket: `burst` capacity, one token regained per `refill_interval`
#[derive(Debug)]
pub struct TokenBucket {
    origin: Instant,
    burst: u32,
    interval_nanos: u64,
    tolerance_nanos: u64,
    tat: AtomicU64,
}

impl TokenBucket {
    pub fn new(burst: u32, refill_interval: Duration) -> Self {
        Self::starting_at(burst, refill_interval, Instant::now())
    }

    /// Bucket whose clock starts at `origin`; instants before it count as `origin`
    pub fn starting_at(burst: u32, refill_interval: Duration, origin: Instant) -> Self {
        let interval_nanos = u64::try_from(refill_interval.as_nanos()).unwrap_or(u64::MAX);
        Self {
            origin,
            burst,
            interval_nanos,
            tolerance_nanos: interval_nanos.saturating_mul(u64::from(burst)),
            tat: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.burst, config.refill_interval())
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    pub fn refill_interval(&self) -> Duration {
        Duration::from_nanos(self.interval_nanos)
    }

    /// Take one token if available. Never blocks.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// [`allow`](Self::allow) against an explicit clock reading
    pub fn allow_at(&self, now: Instant) -> bool {
        if self.interval_nanos == 0 {
            return self.burst > 0;
        }

        let now = u64::try_from(now.saturating_duration_since(self.origin).as_nanos()).unwrap_or(u64::MAX);
        let limit = now.saturating_add(self.tolerance_nanos);

        let mut tat = self.tat.load(Ordering::Acquire);
        loop {
            let next = tat.max(now).saturating_add(self.interval_nanos);
            if next > limit {
                return false;
            }
            match self
                .tat
                .compare_exchange_weak(tat, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(actual) => tat = actual,
            }
        }
    }

    /// Tokens that [`allow_at`](Self::allow_at) would grant right now
    pub fn available_at(&self, now: Instant) -> u32 {
        if self.interval_nanos == 0 {
            return self.burst;
        }
        let now = u64::try_from(now.saturating_duration_since(self.origin).as_nanos()).unwrap_or(u64::MAX);
        let tat = self.tat.load(Ordering::Acquire).max(now);
        let used = (tat - now).div_ceil(self.interval_nanos);
        u32::try_from(u64::from(self.burst).saturating_sub(used)).unwrap_or(0)
    }
}
