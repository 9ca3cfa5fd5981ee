//! Deadline wrapper around any [`KeyValueStore`]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

use super::r#trait::KeyValueStore;

/// Bounds every call on the inner store by a fixed timeout.
///
/// An elapsed deadline surfaces as [`DomainError::StoreUnavailable`]. Dropping
/// the returned future cancels the pending call.
#[derive(Clone)]
pub struct BoundedStore {
    inner: Arc<dyn KeyValueStore>,
    timeout: Duration,
}

impl BoundedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, op: &'static str, key: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    op,
                    key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store operation timed out"
                );
                Err(DomainError::store_unavailable(format!(
                    "{} timed out after {}ms",
                    op,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for BoundedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.bounded("get", key, self.inner.get(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.bounded("set_ex", key, self.inner.set_ex(key, value, ttl)).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.bounded("delete", key, self.inner.delete(key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.bounded("exists", key, self.inner.exists(key)).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        self.bounded("ttl", key, self.inner.ttl(key)).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.bounded("take", key, self.inner.take(key)).await
    }
}
