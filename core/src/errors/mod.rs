//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    /// Key-value store timed out, refused the connection or returned garbage
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    /// Startup-level misconfiguration, e.g. an empty signing secret
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Shorthand for a store failure
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Whether this error is the given token error
    pub fn is_token(&self, expected: &TokenError) -> bool {
        matches!(self, DomainError::Token(e) if e == expected)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
