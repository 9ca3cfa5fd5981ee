//! HS256 access token encoding and verification

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::{Claims, Identity};
use crate::errors::{DomainError, DomainResult, TokenError};

/// Case-insensitive `Bearer ` prefix, exactly one space
const BEARER_PREFIX: &str = "bearer ";

/// Signs and verifies access tokens with a shared secret.
///
/// Stateless apart from the immutable keys, so one instance is shared by
/// every request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    unverified: Validation,
}

impl TokenCodec {
    /// Build a codec; an empty secret is a configuration error
    pub fn new(secret: &str) -> DomainResult<Self> {
        if secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "JWT secret must not be empty".to_string(),
            });
        }

        // Time bounds are checked by hand so both failures map to one variant
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        let mut unverified = validation.clone();
        unverified.insecure_disable_signature_validation();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            validation,
            unverified,
        })
    }

    /// Sign an access token valid from now for `ttl`
    pub fn sign(&self, identity: &Identity, ttl: Duration) -> DomainResult<String> {
        self.sign_at(identity, ttl, Utc::now().timestamp())
    }

    /// Sign an access token issued at unix time `now`
    pub fn sign_at(&self, identity: &Identity, ttl: Duration, now: i64) -> DomainResult<String> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::new(identity, now, ttl_secs);

        encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            DomainError::from(TokenError::SigningFailed {
                message: e.to_string(),
            })
        })
    }

    /// Verify signature, structure and time bounds against the current time
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        self.parse_at(token, Utc::now().timestamp())
    }

    /// Verify signature, structure and time bounds against unix time `now`
    pub fn parse_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                TokenError::Malformed
            })?
            .claims;

        if !claims.is_active_at(now) {
            return Err(TokenError::ExpiredOrNotActive);
        }

        Ok(claims)
    }

    /// Decode the payload without checking signature or time bounds.
    ///
    /// Only for deriving store keys from tokens that may already be invalid;
    /// never authorize anything on the result.
    pub fn parse_unsafe(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.unverified)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Unparseable)
    }

    /// Strip the bearer prefix from an `Authorization` value and [`parse`](Self::parse)
    pub fn parse_from_authorization_header(&self, value: &str) -> Result<Claims, TokenError> {
        let token = strip_bearer(value).ok_or(TokenError::Malformed)?;
        self.parse(token)
    }
}

/// Token part of `Bearer <token>`, matching the scheme case-insensitively
pub fn strip_bearer(value: &str) -> Option<&str> {
    let scheme = value.get(..BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = &value[BEARER_PREFIX.len()..];
    if token.is_empty() || token.starts_with(' ') {
        return None;
    }
    Some(token)
}
