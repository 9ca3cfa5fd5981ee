//! Cache module for Redis-based storage
//!
//! Connection setup with retry, and the key-value operations the token layer
//! needs.

pub mod redis_client;


pub use redis_client::RedisClient;

// Re-export commonly used types
pub use tg_shared::config::CacheConfig;
