//! Identity blacklist consulted on every authenticated request

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::token::blacklist_key;
use crate::domain::entities::{Identity, BLACKLIST_SENTINEL};
use crate::errors::DomainResult;
use crate::repositories::KeyValueStore;

use super::codec::TokenCodec;

/// Reads and writes `sk:black_list_<id>_<name>` markers.
///
/// A marker never needs to outlive the access tokens it blocks, so ban
/// lifetimes are clamped to the access token lifetime.
pub struct RevocationGuard {
    codec: Arc<TokenCodec>,
    store: Arc<dyn KeyValueStore>,
    max_ban_ttl: Duration,
}

impl RevocationGuard {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn KeyValueStore>, max_ban_ttl: Duration) -> Self {
        Self {
            codec,
            store,
            max_ban_ttl,
        }
    }

    /// Whether the identity inside `access_token` is blacklisted.
    ///
    /// Store failures propagate instead of reading as "not blacklisted".
    pub async fn check_blacklist(&self, access_token: &str) -> DomainResult<bool> {
        let claims = self.codec.parse_unsafe(access_token)?;
        self.is_banned(&claims.identity()).await
    }

    /// Whether `identity` carries the blacklist sentinel
    pub async fn is_banned(&self, identity: &Identity) -> DomainResult<bool> {
        let marker = self.store.get(&blacklist_key(identity)).await?;
        Ok(marker.as_deref() == Some(BLACKLIST_SENTINEL))
    }

    /// Blacklist `identity` for `ttl`, clamped to `[1s, access token lifetime]`.
    ///
    /// Returns the lifetime actually written.
    pub async fn ban(&self, identity: &Identity, ttl: Duration) -> DomainResult<Duration> {
        let ttl = ttl.clamp(Duration::from_secs(1), self.max_ban_ttl.max(Duration::from_secs(1)));
        self.store
            .set_ex(&blacklist_key(identity), BLACKLIST_SENTINEL, ttl)
            .await?;

        tracing::info!(user_id = identity.user_id, ttl_secs = ttl.as_secs(), "Identity blacklisted");
        Ok(ttl)
    }
}
