//! Global request rate limiting

use std::sync::Arc;

use async_trait::async_trait;
use tg_core::services::TokenBucket;

use super::chain::{Flow, Middleware};
use crate::context::RequestContext;
use crate::handlers::error::ApiError;

/// Admits a request only when the shared token bucket has a token.
///
/// Rejected requests end with 429 / `TOO_MANY_REQUESTS` before any other
/// middleware sees them.
#[derive(Debug, Clone)]
pub struct RateLimitGate {
    bucket: Arc<TokenBucket>,
}

impl RateLimitGate {
    pub fn new(bucket: Arc<TokenBucket>) -> Self {
        Self { bucket }
    }

    pub fn bucket(&self) -> &TokenBucket {
        &self.bucket
    }
}

#[async_trait(?Send)]
impl Middleware for RateLimitGate {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Flow {
        if self.bucket.allow() {
            return Flow::Next;
        }
        tracing::warn!(parent: ctx.span(), "Rate limit exceeded");
        ctx.abort_with_error(ApiError::TooManyRequests);
        Flow::Abort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[actix_rt::test]
    async fn test_rejects_once_bucket_is_empty() {
        let gate = RateLimitGate::new(Arc::new(TokenBucket::new(2, Duration::from_secs(3600))));

        let mut ctx = RequestContext::new();
        assert_eq!(gate.handle(&mut ctx).await, Flow::Next);
        assert_eq!(gate.handle(&mut ctx).await, Flow::Next);
        assert!(!ctx.is_responded());

        assert_eq!(gate.handle(&mut ctx).await, Flow::Abort);
        let resp = ctx.take_response().unwrap();
        assert_eq!(resp.status(), 429);
    }
}
