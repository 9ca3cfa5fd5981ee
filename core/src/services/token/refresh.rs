//! Store-backed, single-use refresh tokens

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::entities::token::{refresh_cutoff_key, refresh_index_key, refresh_key};
use crate::domain::entities::{Identity, RefreshRecord, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::KeyValueStore;

use super::codec::TokenCodec;

type HmacSha256 = Hmac<Sha256>;

/// Issues access/refresh pairs and rotates refresh tokens.
///
/// Each refresh token maps to a [`RefreshRecord`] under `sx:refresh<token>`.
/// The latest token of every identity is also indexed under
/// `sx:refresh_index_<id>_<name>` so a logout without a token can find it.
///
/// Revoking an identity writes a cutoff under `sx:refresh_cutoff_<id>_<name>`;
/// records issued at or before it are refused on refresh. The cutoff lives as
/// long as a refresh record can, so it outlasts every session it covers.
pub struct RefreshTokenStore {
    codec: Arc<TokenCodec>,
    store: Arc<dyn KeyValueStore>,
    secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn KeyValueStore>,
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            store,
            secret: secret.as_bytes().to_vec(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Sign an access token and persist a fresh refresh token for `identity`
    pub async fn issue(&self, identity: &Identity) -> DomainResult<TokenPair> {
        let access_token = self.codec.sign(identity, self.access_ttl)?;
        let refresh_token = self.generate_refresh_token(identity)?;

        let record = RefreshRecord::new(identity, now_ns());
        let payload = serde_json::to_string(&record).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode refresh record: {}", e),
        })?;

        self.store
            .set_ex(&refresh_key(&refresh_token), &payload, self.refresh_ttl)
            .await?;
        self.store
            .set_ex(&refresh_index_key(identity), &refresh_token, self.refresh_ttl)
            .await?;

        tracing::debug!(user_id = identity.user_id, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The record is taken atomically, so a token is honored at most once even
    /// when presented concurrently.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        if refresh_token.is_empty() {
            return Err(TokenError::RefreshInvalid.into());
        }

        let payload = self
            .store
            .take(&refresh_key(refresh_token))
            .await?
            .filter(|p| !p.is_empty())
            .ok_or(TokenError::RefreshInvalid)?;

        let record: RefreshRecord = serde_json::from_str(&payload).map_err(|e| {
            tracing::warn!(error = %e, "Discarding unreadable refresh record");
            TokenError::RefreshInvalid
        })?;

        let identity = record.identity();
        if let Some(cutoff) = self.cutoff(&identity).await? {
            if record.is_revoked_by(cutoff) {
                tracing::info!(user_id = identity.user_id, "Refused refresh token of a revoked session");
                return Err(TokenError::RefreshInvalid.into());
            }
        }

        self.issue(&identity).await
    }

    /// Delete a refresh token; absent tokens are not an error
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<()> {
        if refresh_token.is_empty() {
            return Ok(());
        }
        self.store.delete(&refresh_key(refresh_token)).await?;
        Ok(())
    }

    /// Revoke the most recently issued refresh token of `identity`.
    ///
    /// Returns whether a live record was deleted. Other sessions of the same
    /// identity stay valid.
    pub async fn revoke_latest(&self, identity: &Identity) -> DomainResult<bool> {
        let Some(token) = self.store.take(&refresh_index_key(identity)).await? else {
            return Ok(false);
        };
        Ok(self.store.delete(&refresh_key(&token)).await?)
    }

    /// Revoke every refresh token issued to `identity` so far.
    ///
    /// Tokens issued afterwards are unaffected. Returns whether the indexed
    /// record was deleted outright; the others are refused when presented.
    pub async fn revoke_by_identity(&self, identity: &Identity) -> DomainResult<bool> {
        self.store
            .set_ex(&refresh_cutoff_key(identity), &now_ns().to_string(), self.refresh_ttl)
            .await?;
        let deleted = self.revoke_latest(identity).await?;

        tracing::info!(user_id = identity.user_id, deleted, "Revoked all refresh tokens of identity");
        Ok(deleted)
    }

    /// Revocation cutoff of `identity`, if one is live
    async fn cutoff(&self, identity: &Identity) -> DomainResult<Option<i64>> {
        let value = self.store.get(&refresh_cutoff_key(identity)).await?;
        Ok(value.and_then(|v| match v.parse() {
            Ok(ns) => Some(ns),
            Err(_) => {
                tracing::warn!(user_id = identity.user_id, "Ignoring unreadable revocation cutoff");
                None
            }
        }))
    }

    /// Lowercase hex HMAC-SHA256 over (nanosecond timestamp, identity, nonce)
    fn generate_refresh_token(&self, identity: &Identity) -> DomainResult<String> {
        let nanos = now_ns();
        let nonce: u64 = rand::random();

        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|e| DomainError::Internal {
            message: format!("Invalid refresh token key: {}", e),
        })?;
        mac.update(format!("{}{}_{}{:016x}", nanos, identity.user_id, identity.user_name, nonce).as_bytes());

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Unix nanoseconds, saturating past the year 2262
fn now_ns() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
