use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tg_api::{
    app::{build_pipeline, create_app},
    routes::AppState,
    telemetry::init_tracing,
};
use tg_core::repositories::KeyValueStore;
use tg_core::services::{TokenService, TokenServiceConfig};
use tg_infra::RedisClient;
use tg_shared::config::{AppConfig, Environment};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Environment-specific file first; dotenvy never overrides a set variable
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        config = %config.to_redacted_json(),
        "Starting Tokengate"
    );

    if config.jwt.is_using_default_secret() {
        if config.environment.is_production() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("Using the default JWT secret; set JWT_SECRET before deploying");
    }

    let redis = RedisClient::new(config.cache.clone())
        .await
        .context("failed to connect to Redis")?;
    if let Err(e) = redis.health_check().await {
        tracing::warn!(error = %e, "Redis health check failed");
    }
    let store: Arc<dyn KeyValueStore> = Arc::new(redis);

    let tokens = Arc::new(TokenService::new(
        TokenServiceConfig::from_configs(&config.jwt, &config.cache),
        store,
    )?);

    let admin_routes = config.server.admin_routes_enabled;
    if admin_routes {
        tracing::warn!("Admin routes enabled; restrict access to /auth/force-logout");
    }
    let state = web::Data::new(AppState::new(tokens.clone()).with_admin_routes(admin_routes));
    let pipeline = build_pipeline(&config, tokens).on_panic(|report| {
        tracing::error!(
            request_id = %report.request_id,
            method = %report.method,
            path = %report.path,
            "Panic contained"
        );
    });
    let bind_address = config.server.bind_address();
    tracing::info!(
        address = %bind_address,
        base_path = %config.server.base_path(),
        cors = config.cors.enabled,
        "Listening"
    );

    let workers = config.server.workers;
    let mut server = HttpServer::new(move || create_app(state.clone(), pipeline.clone(), &config));
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await?;
    Ok(())
}
