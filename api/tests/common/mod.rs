//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    body::{self, MessageBody},
    dev::{Service, ServiceResponse},
    test, web,
};
use async_trait::async_trait;
use tg_api::routes::AppState;
use tg_core::errors::DomainError;
use tg_core::repositories::{InMemoryStore, KeyValueStore};
use tg_core::services::{TokenService, TokenServiceConfig};
use tg_shared::config::{AppConfig, RateLimitConfig};

pub const BASE: &str = "/svc";
pub const SECRET: &str = "integration-test-secret";

pub fn token_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: String::from(SECRET),
        access_token_ttl: Duration::from_secs(900),
        refresh_token_ttl: Duration::from_secs(3600),
        store_timeout: Duration::from_secs(2),
    }
}

/// Token service over a fresh in-memory store
pub fn token_service() -> Arc<TokenService> {
    token_service_with(Arc::new(InMemoryStore::new()))
}

pub fn token_service_with(store: Arc<dyn KeyValueStore>) -> Arc<TokenService> {
    Arc::new(TokenService::new(token_config(), store).expect("valid token config"))
}

/// App config mounting routes under [`BASE`] with rate limiting off
pub fn app_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.server_name = String::from("svc");
    config.server.context_pool_size = 4;
    config.jwt.secret = String::from(SECRET);
    config.rate_limit = RateLimitConfig::development();
    config
}

pub fn state(tokens: &Arc<TokenService>) -> web::Data<AppState> {
    web::Data::new(AppState::new(tokens.clone()))
}

/// State with the administrative routes mounted
pub fn admin_state(tokens: &Arc<TokenService>) -> web::Data<AppState> {
    web::Data::new(AppState::new(tokens.clone()).with_admin_routes(true))
}

pub fn bearer(access_token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", access_token))
}

pub async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> serde_json::Value {
    test::read_body_json(resp).await
}

/// Call `app` and render the outcome the way the server would, error
/// responses included. Returns `(status, body)`; an empty body reads as null.
pub async fn send<S, R, B>(app: &S, req: R) -> (u16, serde_json::Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let response = match app.call(req).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response(),
    };
    let status = response.status().as_u16();
    let bytes = body::to_bytes(response.into_body()).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Store whose every call fails
pub struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
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
