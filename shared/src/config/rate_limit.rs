//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Global request rate limit.
///
/// One shared token bucket: `burst` requests may pass back to back, after
/// which one request is admitted per `refill_interval_ms`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bucket capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Time to regain one token, in milliseconds
    #[serde(default = "default_refill_interval_ms")]
    pub refill_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            burst: default_burst(),
            refill_interval_ms: default_refill_interval_ms(),
        }
    }
}

impl RateLimitConfig {
    /// Load from `RATE_LIMIT_ENABLED`, `RATE_LIMIT_BURST` and `RATE_LIMIT_REFILL_INTERVAL_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.burst),
            refill_interval_ms: std::env::var("RATE_LIMIT_REFILL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refill_interval_ms),
        }
    }

    /// Refill interval as a `Duration`
    pub fn refill_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refill_interval_ms)
    }

    /// Create a development configuration (rate limiting off)
    pub fn development() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_burst() -> u32 {
    100_000
}

fn default_refill_interval_ms() -> u64 {
    1000
}
