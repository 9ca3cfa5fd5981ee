//! Unit tests for domain error types

use crate::errors::{DomainError, TokenError};

#[test]
fn test_token_error_converts_into_domain_error() {
    let error: DomainError = TokenError::RefreshInvalid.into();
    assert!(error.is_token(&TokenError::RefreshInvalid));
    assert!(!error.is_token(&TokenError::Malformed));
    assert_eq!(error.to_string(), "Refresh token invalid");
}

#[test]
fn test_store_unavailable_message() {
    let error = DomainError::store_unavailable("get timed out");
    assert!(matches!(error, DomainError::StoreUnavailable { .. }));
    assert_eq!(error.to_string(), "Store unavailable: get timed out");
}
