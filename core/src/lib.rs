//! # Tokengate Core
//!
//! Token lifecycle for self-issued credentials: signing and verifying access
//! tokens, single-use refresh tokens, the identity blacklist and the
//! process-wide request token bucket. Storage is reached only through the
//! [`KeyValueStore`](repositories::KeyValueStore) capability.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
