use actix_web::{HttpRequest, HttpResponse};
use tg_shared::types::JsonResponse;

use crate::dto::auth::MeResponse;
use crate::handlers::request_language;
use crate::middleware::auth::CurrentUser;

/// Handler for GET /auth/me
pub async fn me(req: HttpRequest, user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(JsonResponse::success(
        MeResponse::from(user.0),
        request_language(&req),
    ))
}
