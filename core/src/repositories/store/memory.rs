//! In-process implementation of [`KeyValueStore`]
//!
//! Used by tests and single-node development setups. Expiry uses
//! `tokio::time::Instant`, so paused test clocks drive TTLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::DomainError;

use super::r#trait::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Writes between two sweeps of expired entries
const SWEEP_EVERY: usize = 64;

/// Map guarded by an async `RwLock`.
///
/// Expired entries are invisible to reads and are swept out on every
/// [`SWEEP_EVERY`]th write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of stored keys, expired ones not yet swept included
    pub async fn stored(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Live keys starting with `prefix`
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        let sweep = (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0;

        let mut entries = self.entries.write().await;
        if sweep {
            entries.retain(|_, e| e.is_live(now));
        }
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.map(|e| e.is_live(now)).unwrap_or(false))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now))
    }

    async fn take(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = Instant::now();
        // Single write guard makes the read and the delete one step
        let removed = self.entries.write().await.remove(key);
        Ok(removed.filter(|e| e.is_live(now)).map(|e| e.value))
    }
}
