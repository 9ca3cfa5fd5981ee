use serde::{Deserialize, Serialize};
use tg_core::domain::{Identity, TokenPair};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    /// Opaque refresh token from a previous login or refresh
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke; without it the caller's latest refresh token is revoked
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForceLogoutRequest {
    pub user_id: i64,

    #[validate(length(min = 1, max = 64))]
    pub user_name: String,

    /// Ban duration in seconds, capped at the access token lifetime
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

impl ForceLogoutRequest {
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.user_name.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn new(pair: TokenPair, expires_in: u64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub user_name: String,
}

impl From<Identity> for MeResponse {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            user_name: identity.user_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceLogoutResponse {
    /// Seconds the identity stays banned
    pub banned_for: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_rejects_empty_token() {
        let request = RefreshTokenRequest {
            refresh_token: String::new(),
        };
        assert!(request.validate().is_err());

        let request = RefreshTokenRequest {
            refresh_token: String::from("abc"),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_force_logout_request_validation() {
        let request: ForceLogoutRequest =
            serde_json::from_str(r#"{"user_id": 5, "user_name": ""}"#).unwrap();
        assert!(request.validate().is_err());

        let request: ForceLogoutRequest =
            serde_json::from_str(r#"{"user_id": 5, "user_name": "eve", "ttl_seconds": 60}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.identity(), Identity::new(5, "eve"));
    }

    #[test]
    fn test_logout_request_token_is_optional() {
        let request: LogoutRequest = serde_json::from_str("{}").unwrap();
        assert!(request.refresh_token.is_none());
    }
}
