//! Token entities for JWT-based authentication.

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Prefix of refresh records: `sx:refresh<refresh-token>`
pub const REFRESH_KEY_PREFIX: &str = "sx:refresh";

/// Prefix of the per-identity pointer to the latest refresh token:
/// `sx:refresh_index_<id>_<name>`
pub const REFRESH_INDEX_KEY_PREFIX: &str = "sx:refresh_index_";

/// Prefix of the per-identity revocation cutoff:
/// `sx:refresh_cutoff_<id>_<name>` holding unix nanoseconds
pub const REFRESH_CUTOFF_KEY_PREFIX: &str = "sx:refresh_cutoff_";

/// Prefix of blacklist markers: `sk:black_list_<id>_<name>`
pub const BLACKLIST_KEY_PREFIX: &str = "sk:black_list_";

/// The only marker value that counts as "blacklisted"
pub const BLACKLIST_SENTINEL: &str = "1";

/// Claims structure for JWT payload
///
/// Field names `UserID` / `UserName` are kept on the wire so tokens minted by
/// existing deployments keep verifying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "UserID")]
    pub user_id: i64,

    #[serde(rename = "UserName")]
    pub user_name: String,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Not before timestamp
    #[serde(default)]
    pub nbf: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,
}

impl Claims {
    /// Claims issued at `now` and valid for `ttl_secs`.
    ///
    /// A non-positive lifetime is rounded up to one second so `exp > iat` holds.
    pub fn new(identity: &Identity, now: i64, ttl_secs: i64) -> Self {
        Self {
            user_id: identity.user_id,
            user_name: identity.user_name.clone(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl_secs.max(1)),
        }
    }

    /// `nbf <= now < exp`
    pub fn is_active_at(&self, now: i64) -> bool {
        now >= self.nbf && now < self.exp
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.user_name.clone())
    }
}

/// Value stored under a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub user_id: i64,
    pub user_name: String,

    /// Unix seconds at issuance; absent in records written by older deployments
    #[serde(default)]
    pub created_at: i64,

    /// Unix nanoseconds at issuance, compared against the identity's
    /// revocation cutoff. Zero for records written by older deployments.
    #[serde(default)]
    pub issued_ns: i64,
}

impl RefreshRecord {
    pub fn new(identity: &Identity, issued_ns: i64) -> Self {
        Self {
            user_id: identity.user_id,
            user_name: identity.user_name.clone(),
            created_at: issued_ns.div_euclid(1_000_000_000),
            issued_ns,
        }
    }

    /// Whether a revocation at `cutoff_ns` covers this record
    pub fn is_revoked_by(&self, cutoff_ns: i64) -> bool {
        self.issued_ns <= cutoff_ns
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.user_name.clone())
    }
}

/// Token pair returned to the client after login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Store key of a refresh record
pub fn refresh_key(refresh_token: &str) -> String {
    format!("{}{}", REFRESH_KEY_PREFIX, refresh_token)
}

/// Store key of the latest-refresh-token pointer of `identity`
pub fn refresh_index_key(identity: &Identity) -> String {
    format!("{}{}", REFRESH_INDEX_KEY_PREFIX, identity.key_fragment())
}

/// Store key of the revocation cutoff of `identity`
pub fn refresh_cutoff_key(identity: &Identity) -> String {
    format!("{}{}", REFRESH_CUTOFF_KEY_PREFIX, identity.key_fragment())
}

/// Store key of the blacklist marker of `identity`
pub fn blacklist_key(identity: &Identity) -> String {
    format!("{}{}", BLACKLIST_KEY_PREFIX, identity.key_fragment())
}
