//! HTTP routes, mounted under the service base path

pub mod auth;
pub mod system;

use std::sync::Arc;

use actix_web::web;
use tg_core::services::TokenService;

/// Shared state handed to every handler
pub struct AppState {
    pub tokens: Arc<TokenService>,
    /// Host name reported by the health check
    pub host: String,
    /// Whether administrative routes are mounted
    pub admin_routes: bool,
}

impl AppState {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            host: system::health::host_name(),
            admin_routes: false,
        }
    }

    pub fn with_admin_routes(mut self, enabled: bool) -> Self {
        self.admin_routes = enabled;
        self
    }
}

/// Register every route relative to the base scope.
///
/// `POST /auth/force-logout` lets any authenticated caller ban any identity,
/// so it is only mounted when `admin_routes` is set. Deployments enabling it
/// must restrict who can reach it.
pub fn configure(cfg: &mut web::ServiceConfig, admin_routes: bool) {
    let mut auth_scope = web::scope("/auth")
        .route("/refresh", web::post().to(auth::refresh::refresh))
        .route("/logout", web::post().to(auth::logout::logout))
        .route("/me", web::get().to(auth::me::me));
    if admin_routes {
        auth_scope = auth_scope.route("/force-logout", web::post().to(auth::force_logout::force_logout));
    }

    cfg.service(auth_scope)
        .service(web::scope("/system").route("/health", web::get().to(system::health::health)));
}
