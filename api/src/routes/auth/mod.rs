//! Token lifecycle endpoints
//!
//! - `POST /auth/refresh` rotates a refresh token (public)
//! - `POST /auth/logout` revokes the caller's refresh token
//! - `GET /auth/me` returns the caller's identity
//! - `POST /auth/force-logout` bans an identity and revokes every refresh token
//!   issued to it; mounted only with admin routes enabled

pub mod force_logout;
pub mod logout;
pub mod me;
pub mod refresh;
