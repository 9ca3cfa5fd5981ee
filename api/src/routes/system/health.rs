use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use tg_shared::types::JsonResponse;

use crate::context::disable_access_log;
use crate::handlers::request_language;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub timestamp: i64,
    pub host: String,
    pub status: &'static str,
}

/// Handler for GET /system/health
///
/// Liveness only; does not touch the token store. Excluded from the access log.
pub async fn health(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    disable_access_log(&req);

    HttpResponse::Ok().json(JsonResponse::success(
        HealthResponse {
            timestamp: Utc::now().timestamp(),
            host: state.host.clone(),
            status: "ok",
        },
        request_language(&req),
    ))
}

/// `HOSTNAME`, then the kernel host name, then `"unknown"`
pub fn host_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/proc/sys/kernel/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| String::from("unknown"))
}
