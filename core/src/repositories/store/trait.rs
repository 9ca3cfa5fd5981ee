//! Key-value capability used by the refresh store and the revocation guard.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

/// The narrow slice of a key-value store the token layer needs.
///
/// Implementations must report transport failures as
/// [`DomainError::StoreUnavailable`]; a missing key is `Ok(None)` / `Ok(false)`,
/// never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Write a value that expires after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Check whether a key exists
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Remaining lifetime of a key; `None` when absent or without expiry
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError>;

    /// Atomically read and delete a key.
    ///
    /// Of two concurrent callers on the same key at most one sees the value.
    async fn take(&self, key: &str) -> Result<Option<String>, DomainError>;
}
