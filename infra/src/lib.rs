//! # Infrastructure Layer
//!
//! Concrete implementations of the storage capability defined in `tg_core`.
//!
//! - **Cache**: Redis client implementing [`KeyValueStore`](tg_core::repositories::KeyValueStore)

use tg_core::errors::DomainError;

/// Cache module - Redis client and operations
pub mod cache;

pub use cache::RedisClient;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(e) => DomainError::StoreUnavailable {
                message: e.to_string(),
            },
            InfrastructureError::Config(message) => DomainError::Configuration { message },
        }
    }
}
