//! Domain layer containing the identity and token entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{Claims, Identity, RefreshRecord, TokenPair};
