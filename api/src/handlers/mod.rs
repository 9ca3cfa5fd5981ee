//! Shared handler plumbing: the API error type and body extractor config

pub mod error;

pub use error::ApiError;

use actix_web::{error::JsonPayloadError, http::header::ACCEPT_LANGUAGE, web, HttpRequest};
use tg_shared::types::Language;

/// JSON extractor config mapping every body error to `PARAM_BIND_ERROR`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    ApiError::ParamBind(err.to_string()).into()
}

/// Response language preferred by the caller's `Accept-Language` header
pub fn request_language(req: &HttpRequest) -> Language {
    req.headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}
