//! Shared configuration and common types for Tokengate
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Business error codes and their localized texts
//! - The JSON response envelope and language detection

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CorsConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    RateLimitConfig, ServerConfig,
};
pub use errors::{code_text, error_codes};
pub use types::{JsonResponse, Language};
