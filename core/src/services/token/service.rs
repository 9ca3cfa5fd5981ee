//! Main token service implementation

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Identity, TokenPair};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::{BoundedStore, KeyValueStore};

use super::codec::{strip_bearer, TokenCodec};
use super::config::TokenServiceConfig;
use super::refresh::RefreshTokenStore;
use super::revocation::RevocationGuard;
use super::url_sign::UrlSigner;

/// Facade over the codec, the refresh store, the revocation guard and the URL
/// signer.
///
/// All store traffic goes through a [`BoundedStore`] built from
/// `config.store_timeout`.
pub struct TokenService {
    codec: Arc<TokenCodec>,
    refresh: RefreshTokenStore,
    revocation: RevocationGuard,
    url_signer: UrlSigner,
    config: TokenServiceConfig,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    /// * `store` - Key-value store holding refresh records and blacklist markers
    ///
    /// # Returns
    ///
    /// A new `TokenService` or a configuration error for an empty secret
    pub fn new(config: TokenServiceConfig, store: Arc<dyn KeyValueStore>) -> DomainResult<Self> {
        let codec = Arc::new(TokenCodec::new(&config.jwt_secret)?);
        let url_signer = UrlSigner::new(&config.jwt_secret)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(BoundedStore::new(store, config.store_timeout));

        let refresh = RefreshTokenStore::new(
            codec.clone(),
            store.clone(),
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        );
        let revocation = RevocationGuard::new(codec.clone(), store, config.access_token_ttl);

        Ok(Self {
            codec,
            refresh,
            revocation,
            url_signer,
            config,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn refresh_store(&self) -> &RefreshTokenStore {
        &self.refresh
    }

    pub fn revocation(&self) -> &RevocationGuard {
        &self.revocation
    }

    pub fn url_signer(&self) -> &UrlSigner {
        &self.url_signer
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issue a token pair for an identity whose credentials were verified elsewhere
    pub async fn login(&self, identity: &Identity) -> DomainResult<TokenPair> {
        self.refresh.issue(identity).await
    }

    /// Rotate a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.refresh.refresh(refresh_token).await
    }

    /// Drop a session: the given refresh token, or the identity's latest one
    pub async fn logout(&self, identity: &Identity, refresh_token: Option<&str>) -> DomainResult<()> {
        match refresh_token.filter(|t| !t.is_empty()) {
            Some(token) => self.refresh.revoke(token).await,
            None => self.refresh.revoke_latest(identity).await.map(|_| ()),
        }
    }

    /// Blacklist an identity and revoke every refresh token issued to it.
    ///
    /// `ttl` defaults to the access token lifetime. Returns the ban lifetime
    /// actually applied.
    pub async fn force_logout(&self, identity: &Identity, ttl: Option<Duration>) -> DomainResult<Duration> {
        let applied = self
            .revocation
            .ban(identity, ttl.unwrap_or(self.config.access_token_ttl))
            .await?;
        self.refresh.revoke_by_identity(identity).await?;

        tracing::info!(user_id = identity.user_id, "Forced logout");
        Ok(applied)
    }

    /// Resolve an `Authorization` header value to an identity.
    ///
    /// Verifies the bearer token, then consults the blacklist.
    pub async fn authenticate(&self, authorization: &str) -> DomainResult<Identity> {
        let token = strip_bearer(authorization).ok_or(TokenError::Malformed)?;
        let claims = self.codec.parse(token)?;

        if self.revocation.check_blacklist(token).await? {
            return Err(TokenError::Revoked.into());
        }

        Ok(claims.identity())
    }
}
