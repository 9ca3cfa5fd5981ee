//! Bearer-token authentication for protected routes.
//!
//! [`AuthMiddleware`] runs inside the pipeline chain. It hands the request
//! context to an [`Authenticator`]; on success the resolved [`Identity`] is
//! stored in the context, and the pipeline copies it into the request
//! extensions where handlers read it through [`CurrentUser`].

use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{dev::Payload, http::header::AUTHORIZATION, FromRequest, HttpMessage, HttpRequest};
use async_trait::async_trait;
use tg_core::domain::Identity;
use tg_core::services::TokenService;

use super::chain::{Flow, Middleware};
use crate::context::RequestContext;
use crate::handlers::error::ApiError;

/// Resolves the caller of a request
#[async_trait(?Send)]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, ctx: &RequestContext) -> Result<Identity, ApiError>;
}

/// Verifies `Authorization: Bearer <access token>` against the token service,
/// blacklist included
#[derive(Clone)]
pub struct BearerAuthenticator {
    tokens: Arc<TokenService>,
}

impl BearerAuthenticator {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait(?Send)]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, ctx: &RequestContext) -> Result<Identity, ApiError> {
        let header = ctx
            .header(AUTHORIZATION.as_str())
            .ok_or(ApiError::Unauthorized)?;
        Ok(self.tokens.authenticate(header).await?)
    }
}

/// Future returned by closure authenticators
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<Identity, ApiError>> + 'a>>;

/// Authenticator backed by a closure
pub struct FnAuthenticator<F> {
    f: F,
}

#[async_trait(?Send)]
impl<F> Authenticator for FnAuthenticator<F>
where
    F: for<'a> Fn(&'a RequestContext) -> AuthFuture<'a> + Send + Sync,
{
    async fn authenticate(&self, ctx: &RequestContext) -> Result<Identity, ApiError> {
        (self.f)(ctx).await
    }
}

/// Chain entry enforcing authentication on every path except the exempt ones
#[derive(Clone)]
pub struct AuthMiddleware {
    authenticator: Arc<dyn Authenticator>,
    exempt: Vec<String>,
}

impl AuthMiddleware {
    pub fn new<A: Authenticator + 'static>(authenticator: A) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            exempt: Vec::new(),
        }
    }

    /// Bearer-token authentication through `tokens`
    pub fn bearer(tokens: Arc<TokenService>) -> Self {
        Self::new(BearerAuthenticator::new(tokens))
    }

    /// Authentication through a closure returning a boxed future
    pub fn from_fn<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext) -> AuthFuture<'a> + Send + Sync + 'static,
    {
        Self::new(FnAuthenticator { f })
    }

    /// Skip authentication for an exact request path
    pub fn exempt(mut self, path: impl Into<String>) -> Self {
        self.exempt.push(path.into());
        self
    }

    fn is_exempt(&self, path: &str) -> bool {
        self.exempt.iter().any(|p| p == path)
    }
}

#[async_trait(?Send)]
impl Middleware for AuthMiddleware {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        if self.is_exempt(ctx.path()) {
            return Flow::Next;
        }

        match self.authenticator.authenticate(ctx).await {
            Ok(identity) => {
                tracing::debug!(parent: ctx.span(), user = %identity, "Authenticated");
                ctx.set_identity(identity);
                Flow::Next
            }
            Err(e) => {
                tracing::debug!(parent: ctx.span(), error = %e, "Authentication failed");
                ctx.abort_with_error(e);
                Flow::Abort
            }
        }
    }
}

/// Extractor for the authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized);

        ready(result)
    }
}
