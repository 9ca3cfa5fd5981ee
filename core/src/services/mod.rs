//! Business services containing domain logic and use cases.

pub mod rate_limit;
pub mod token;

// Re-export commonly used types
pub use rate_limit::TokenBucket;
pub use token::{
    RefreshTokenStore, RevocationGuard, TokenCodec, TokenService, TokenServiceConfig,
};
