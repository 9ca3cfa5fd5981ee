use actix_web::{web, HttpRequest, HttpResponse};
use tg_shared::types::JsonResponse;

use crate::dto::auth::LogoutRequest;
use crate::handlers::{request_language, ApiError};
use crate::middleware::auth::CurrentUser;
use crate::routes::AppState;

/// Handler for POST /auth/logout
///
/// Revokes the refresh token in the body, or the caller's latest refresh
/// token when the body carries none. Idempotent. The access token stays
/// valid until it expires.
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse, ApiError> {
    let refresh_token = body
        .and_then(|b| b.into_inner().refresh_token)
        .filter(|t| !t.is_empty());

    state.tokens.logout(&user.0, refresh_token.as_deref()).await?;
    tracing::info!(user = %user.0, "Logged out");

    Ok(HttpResponse::Ok().json(JsonResponse::success(
        serde_json::json!({}),
        request_language(&req),
    )))
}
