//! Token service module
//!
//! - HS256 access token signing and verification
//! - Single-use refresh tokens with atomic rotation
//! - Identity blacklist
//! - Signed request URLs

mod codec;
mod config;
mod refresh;
mod revocation;
mod service;
mod url_sign;

#[cfg(test)]
mod tests;

pub use codec::{strip_bearer, TokenCodec};
pub use config::TokenServiceConfig;
pub use refresh::RefreshTokenStore;
pub use revocation::RevocationGuard;
pub use service::TokenService;
pub use url_sign::{encode_params, UrlSigner, SIGNABLE_METHODS};
