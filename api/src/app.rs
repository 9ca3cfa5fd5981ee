//! Application factory
//!
//! Builds the actix `App`: shared state, the JSON extractor config, the
//! request pipeline wrapping every route, the optional CORS layer outside it,
//! and the routes under the base path.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Condition,
    web, App, Error,
};
use tg_core::services::{TokenBucket, TokenService};
use tg_shared::config::AppConfig;

use crate::context::ContextPool;
use crate::handlers::json_config;
use crate::middleware::{create_cors, AuthMiddleware, Pipeline};
use crate::routes::{self, AppState};

/// Create the application around an already built pipeline
pub fn create_app(
    state: web::Data<AppState>,
    pipeline: Pipeline,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let admin_routes = state.admin_routes;
    App::new()
        .app_data(state)
        .app_data(json_config())
        .wrap(pipeline)
        .wrap(Condition::new(config.cors.enabled, create_cors(&config.cors)))
        .service(
            web::scope(&config.server.base_path())
                .configure(|cfg| routes::configure(cfg, admin_routes)),
        )
}

/// Pipeline for the service: context pool, optional global rate limit, and
/// bearer authentication on every route except health and refresh.
///
/// Authentication runs before routing, so an unknown path under the base
/// answers 401 / `AuthorizationError` to an anonymous caller and 404 only once
/// a valid token is presented.
///
/// Built once and cloned into every worker so the pool and the bucket are
/// shared process-wide.
pub fn build_pipeline(config: &AppConfig, tokens: Arc<TokenService>) -> Pipeline {
    let base_path = config.server.base_path();
    let mut pipeline = Pipeline::new(ContextPool::new(config.server.context_pool_size));

    if config.rate_limit.enabled {
        let bucket = TokenBucket::from_config(&config.rate_limit);
        tracing::info!(
            burst = bucket.burst(),
            refill_ms = bucket.refill_interval().as_millis() as u64,
            "Rate limiting enabled"
        );
        pipeline = pipeline.with_rate_limiter(Arc::new(bucket));
    }

    pipeline.with(
        AuthMiddleware::bearer(tokens)
            .exempt(format!("{}/system/health", base_path))
            .exempt(format!("{}/auth/refresh", base_path)),
    )
}
