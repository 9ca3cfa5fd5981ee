//! Ordered middleware chain run inside the pipeline

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::handlers::error::ApiError;

/// What the chain does after a middleware returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next middleware, then the handler
    Next,
    /// Stop here; the middleware has written the response
    Abort,
}

/// One entry of the chain.
///
/// A middleware may read and write the context, then either let the request
/// continue or abort it after writing a response with
/// [`RequestContext::abort_with_error`] / [`RequestContext::payload`].
#[async_trait(?Send)]
pub trait Middleware: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn handle(&self, ctx: &mut RequestContext) -> Flow;
}

/// Middlewares executed in declaration order
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run every middleware until one aborts
    pub async fn run(&self, ctx: &mut RequestContext) -> Flow {
        for layer in &self.layers {
            if layer.handle(ctx).await == Flow::Abort {
                if !ctx.is_responded() {
                    tracing::warn!(
                        parent: ctx.span(),
                        middleware = layer.name(),
                        "Middleware aborted without a response"
                    );
                    ctx.abort_with_error(ApiError::Domain(
                        tg_core::errors::DomainError::Internal {
                            message: format!("{} aborted without a response", layer.name()),
                        },
                    ));
                }
                tracing::debug!(parent: ctx.span(), middleware = layer.name(), "Chain aborted");
                return Flow::Abort;
            }
        }
        Flow::Next
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|layer| layer.name()))
            .finish()
    }
}
