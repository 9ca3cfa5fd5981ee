//! API error type and its mapping to HTTP status + business code

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tg_core::errors::{DomainError, TokenError};
use tg_shared::errors::error_codes;
use tg_shared::types::{JsonResponse, Language};

/// Every failure a request can end in.
///
/// Rendered as `{code, msg, data: {}}` with a catalogue message; internal
/// detail only reaches the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A handler or middleware panicked
    #[error("Internal panic")]
    InternalPanic,

    /// Rejected by the request token bucket
    #[error("Too many requests")]
    TooManyRequests,

    /// No usable credentials on the request
    #[error("Unauthorized")]
    Unauthorized,

    /// Body or query failed to deserialize or validate
    #[error("Invalid parameters: {0}")]
    ParamBind(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ParamBind(err.to_string())
    }
}

impl ApiError {
    /// `(http status, business code)`
    pub fn classify(&self) -> (StatusCode, i32) {
        use error_codes::*;

        match self {
            ApiError::InternalPanic => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR),
            ApiError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, AUTHORIZATION_ERROR),
            ApiError::ParamBind(_) => (StatusCode::BAD_REQUEST, PARAM_BIND_ERROR),
            ApiError::Domain(domain) => match domain {
                DomainError::Token(token) => match token {
                    TokenError::Malformed
                    | TokenError::Unparseable
                    | TokenError::Revoked
                    | TokenError::SignatureMismatch => (StatusCode::UNAUTHORIZED, AUTHORIZATION_ERROR),
                    TokenError::ExpiredOrNotActive => (StatusCode::UNAUTHORIZED, TOKEN_EXPIRED),
                    TokenError::RefreshInvalid => (StatusCode::UNAUTHORIZED, REFRESH_TOKEN_ERROR),
                    TokenError::SigningFailed { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
                    }
                    TokenError::UnsupportedMethod { .. } => (StatusCode::BAD_REQUEST, PARAM_BIND_ERROR),
                },
                DomainError::Unauthorized => (StatusCode::UNAUTHORIZED, AUTHORIZATION_ERROR),
                DomainError::StoreUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, SERVICE_UNAVAILABLE)
                }
                DomainError::Configuration { .. } | DomainError::Internal { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
                }
            },
        }
    }

    pub fn business_code(&self) -> i32 {
        self.classify().1
    }

    /// Response envelope in `lang`
    pub fn envelope(&self, lang: Language) -> JsonResponse {
        JsonResponse::error_auto_msg(self.business_code(), lang)
    }

    /// Full HTTP response in `lang`
    pub fn to_response(&self, lang: Language) -> HttpResponse {
        let (status, _) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        HttpResponse::build(status).json(self.envelope(lang))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        // The pipeline re-renders in the caller's language
        self.to_response(Language::default())
    }
}
