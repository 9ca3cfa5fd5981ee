//! Misbehaving stores for failure-path tests

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

use super::memory::InMemoryStore;
use super::r#trait::KeyValueStore;

/// Every call fails as if the connection were refused
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }

    async fn exists(&self, _key: &str) -> Result<bool, DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }

    async fn ttl(&self, _key: &str) -> Result<Option<Duration>, DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }

    async fn take(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::store_unavailable("connection refused"))
    }
}

/// Delays every call by `delay` before delegating to an in-memory store
#[derive(Debug, Default)]
pub struct SlowStore {
    pub inner: InMemoryStore,
    pub delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set_ex(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.exists(key).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.ttl(key).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.take(key).await
    }
}
