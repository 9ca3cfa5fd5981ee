
use std::sync::Arc;
use std::time::Duration;

use crate::repositories::{InMemoryStore, KeyValueStore};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) const SECRET: &str = "unit-test-secret";

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: SECRET.to_string(),
        access_token_ttl: Duration::from_secs(900),
        refresh_token_ttl: Duration::from_secs(3600),
        store_timeout: Duration::from_secs(2),
    }
}

/// Service over a fresh in-memory store; the store handle shares its map
pub(super) fn service_with_store() -> (TokenService, InMemoryStore) {
    let store = InMemoryStore::new();
    let backing: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let service = TokenService::new(test_config(), backing).unwrap();
    (service, store)
}
