//! Per-request context
//!
//! A [`RequestContext`] is owned by exactly one in-flight request. It is drawn
//! from a [`ContextPool`] when the request enters the pipeline and cleared and
//! returned when the request leaves it, whichever way it leaves.

mod pool;

pub use pool::{ContextPool, PooledContext};

use std::time::Instant;

use actix_web::dev::ServiceRequest;
use actix_web::http::header::{HeaderMap, ACCEPT_LANGUAGE};
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use tg_core::domain::Identity;
use tg_shared::types::{JsonResponse, Language};
use tracing::Span;

use crate::handlers::error::ApiError;

/// Request extension marking a request whose access log line is suppressed
#[derive(Debug, Clone, Copy)]
pub struct AccessLogDisabled;

/// Suppress the access log line of the request behind `req`.
///
/// For handlers, which cannot reach the pooled context directly.
pub fn disable_access_log(req: &HttpRequest) {
    req.extensions_mut().insert(AccessLogDisabled);
}

/// Strongly typed state of one request
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    headers: HeaderMap,
    request_id: String,
    language: Language,
    span: Span,
    started_at: Option<Instant>,
    identity: Option<Identity>,
    response: Option<(StatusCode, JsonResponse)>,
    responded: bool,
    log_disabled: bool,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: String::new(),
            headers: HeaderMap::new(),
            request_id: String::new(),
            language: Language::default(),
            span: Span::none(),
            started_at: None,
            identity: None,
            response: None,
            responded: false,
            log_disabled: false,
        }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill request-derived fields for `req`
    pub fn begin(&mut self, req: &ServiceRequest) {
        self.method = req.method().clone();
        self.path.clear();
        self.path.push_str(req.path());
        self.headers.clear();
        for (name, value) in req.headers().iter() {
            self.headers.append(name.clone(), value.clone());
        }
        self.request_id.clear();
        self.request_id.push_str(&uuid::Uuid::new_v4().to_string());
        self.language = self
            .header(ACCEPT_LANGUAGE.as_str())
            .map(Language::from_accept_language)
            .unwrap_or_default();
        self.span = tracing::info_span!(
            "request",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
        );
        self.started_at = Some(Instant::now());
    }

    /// Clear every per-request field. Allocations are kept for reuse.
    pub fn reset(&mut self) {
        self.method = Method::GET;
        self.path.clear();
        self.headers.clear();
        self.request_id.clear();
        self.language = Language::default();
        self.span = Span::none();
        self.started_at = None;
        self.identity = None;
        self.response = None;
        self.responded = false;
        self.log_disabled = false;
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as UTF-8, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Request-scoped logger
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Whether a response has been written
    pub fn is_responded(&self) -> bool {
        self.responded
    }

    /// Write an error response. No-op once a response is set.
    pub fn abort_with_error(&mut self, error: ApiError) {
        if self.responded {
            tracing::debug!(parent: &self.span, error = %error, "Response already set, dropping error");
            return;
        }
        let (status, _) = error.classify();
        tracing::debug!(parent: &self.span, error = %error, status = status.as_u16(), "Request aborted");
        self.response = Some((status, error.envelope(self.language)));
        self.responded = true;
    }

    /// Write a success response carrying `data`. No-op once a response is set.
    pub fn payload<T: Serialize>(&mut self, data: T) {
        if self.responded {
            return;
        }
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(parent: &self.span, error = %e, "Failed to serialize payload");
                self.abort_with_error(ApiError::Domain(tg_core::errors::DomainError::Internal {
                    message: e.to_string(),
                }));
                return;
            }
        };
        self.response = Some((StatusCode::OK, JsonResponse::success(data, self.language)));
        self.responded = true;
    }

    /// Render the written response, if any, leaving the "responded" mark in place
    pub fn take_response(&mut self) -> Option<HttpResponse> {
        self.response
            .take()
            .map(|(status, body)| HttpResponse::build(status).json(body))
    }

    /// Suppress the access log line for this request
    pub fn disable_log(&mut self) {
        self.log_disabled = true;
    }

    pub fn is_log_disabled(&self) -> bool {
        self.log_disabled
    }
}
