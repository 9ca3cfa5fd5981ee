use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse};
use tg_shared::types::JsonResponse;
use validator::Validate;

use crate::dto::auth::{ForceLogoutRequest, ForceLogoutResponse};
use crate::handlers::{request_language, ApiError};
use crate::middleware::auth::CurrentUser;
use crate::routes::AppState;

/// Handler for POST /auth/force-logout
///
/// Blacklists the target identity, so its outstanding access tokens are
/// refused, and revokes its latest refresh token. The ban lasts
/// `ttl_seconds`, defaulting to and capped at the access token lifetime.
///
/// Any authenticated caller may use it; deployments put their own
/// authorization middleware in front.
pub async fn force_logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<ForceLogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let target = body.identity();
    let ttl = body.ttl_seconds.map(Duration::from_secs);
    let banned_for = state.tokens.force_logout(&target, ttl).await?;
    tracing::info!(
        by = %user.0,
        target = %target,
        banned_for_secs = banned_for.as_secs(),
        "Forced logout"
    );

    Ok(HttpResponse::Ok().json(JsonResponse::success(
        ForceLogoutResponse {
            banned_for: banned_for.as_secs(),
        },
        request_language(&req),
    )))
}
