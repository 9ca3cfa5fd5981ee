//! Token-related error types
//!
//! Only these variants are externally distinguishable; every low-level decode
//! failure collapses into [`TokenError::Malformed`].

use thiserror::Error;

/// Token validation and refresh failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, bad structure, wrong algorithm or missing bearer prefix
    #[error("Token malformed")]
    Malformed,

    /// `exp <= now` or `nbf > now`
    #[error("Token expired or not yet valid")]
    ExpiredOrNotActive,

    /// Refresh record absent, expired, empty or already consumed
    #[error("Refresh token invalid")]
    RefreshInvalid,

    /// Payload could not be decoded even without signature checks
    #[error("Token unparseable")]
    Unparseable,

    /// The identity carried by the token is blacklisted
    #[error("Token revoked")]
    Revoked,

    #[error("Token signing failed: {message}")]
    SigningFailed { message: String },

    /// URL signature requested for a method outside the allowed set
    #[error("Unsupported method for URL signature: {method}")]
    UnsupportedMethod { method: String },

    /// URL signature does not match the request
    #[error("URL signature mismatch")]
    SignatureMismatch,
}
