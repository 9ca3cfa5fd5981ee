use actix_web::{web, HttpRequest, HttpResponse};
use tg_shared::types::JsonResponse;
use validator::Validate;

use crate::dto::auth::{RefreshTokenRequest, TokenResponse};
use crate::handlers::{request_language, ApiError};
use crate::routes::AppState;

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new token pair. The presented token is
/// consumed: a second use fails with `REFRESH_TOKEN_ERROR`.
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "9f2c..." }
/// ```
///
/// # Errors
/// - 400 `PARAM_BIND_ERROR`: missing or empty `refresh_token`
/// - 401 `REFRESH_TOKEN_ERROR`: unknown, expired or already used token
/// - 503 `SERVICE_UNAVAILABLE`: token store unreachable
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let pair = state.tokens.refresh(&body.refresh_token).await?;
    let expires_in = state.tokens.config().access_token_ttl.as_secs();

    Ok(HttpResponse::Ok().json(JsonResponse::success(
        TokenResponse::new(pair, expires_in),
        request_language(&req),
    )))
}
