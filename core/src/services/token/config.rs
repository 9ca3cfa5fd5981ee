//! Configuration for the token service

use std::time::Duration;

use tg_shared::config::{CacheConfig, JwtConfig};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Shared secret for HS256 signatures and refresh-token MACs
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Deadline for every key-value store call
    pub store_timeout: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from_configs(&JwtConfig::default(), &CacheConfig::default())
    }
}

impl TokenServiceConfig {
    pub fn from_configs(jwt: &JwtConfig, cache: &CacheConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            access_token_ttl: Duration::from_secs(jwt.access_token_expiry.max(1) as u64),
            refresh_token_ttl: Duration::from_secs(jwt.refresh_token_expiry.max(1) as u64),
            store_timeout: cache.operation_timeout(),
        }
    }

    /// Default lifetimes and timeouts around `secret`
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Self::default()
        }
    }
}
