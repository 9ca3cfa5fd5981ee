//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Access/refresh token lifetimes and the signing secret
//! - `cache` - Redis connection and store operation timeouts
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Global request token bucket
//! - `server` - HTTP server, route prefix and CORS

pub mod auth;
pub mod cache;
pub mod environment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::{CorsConfig, ServerConfig};

/// Complete application configuration combining all sub-configurations.
///
/// Built once at startup and handed to constructors explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Cross-origin configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            cors: CorsConfig::from_env(),
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Serialize for the startup log, with the signing secret masked
    pub fn to_redacted_json(&self) -> String {
        let mut redacted = self.clone();
        redacted.jwt.secret = String::from("***");
        serde_json::to_string(&redacted).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_json_hides_secret() {
        let mut config = AppConfig::default();
        config.jwt.secret = String::from("top-secret-value");

        let json = config.to_redacted_json();
        assert!(!json.contains("top-secret-value"));
        assert!(json.contains("***"));
    }
}
