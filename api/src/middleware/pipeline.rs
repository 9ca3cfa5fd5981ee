//! Request pipeline.
//!
//! Every request passes through one [`Pipeline`] wrapping the whole app:
//!
//! 1. a context is drawn from the pool and filled from the request;
//! 2. the rate-limit gate, if configured, may reject it;
//! 3. the middleware chain runs in order and may abort it;
//! 4. otherwise the resolved identity is attached and the handler runs.
//!
//! Steps 2 to 4 run inside a fault boundary: a panic anywhere in them is
//! logged with its panic-site backtrace, reported to the optional notifier and
//! returned as an error carrying a 500 / `SERVER_ERROR` response. The request
//! itself is gone by then, so the server renders that response. The context
//! returns to the pool on every path.

use std::future::{ready, Ready};
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::StatusCode,
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use tg_core::services::TokenBucket;
use tg_shared::types::Language;

use super::chain::{Chain, Flow, Middleware};
use super::rate_limit::RateLimitGate;
use super::recovery::{install_panic_hook, panic_message, take_captured, Guarded};
use crate::context::{AccessLogDisabled, ContextPool, RequestContext};
use crate::handlers::error::ApiError;

/// What a panic notifier receives
#[derive(Debug, Clone)]
pub struct PanicReport {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub message: String,
    pub location: Option<String>,
    pub backtrace: String,
}

type PanicNotifier = Arc<dyn Fn(&PanicReport) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Handled,
    Aborted,
    Panicked,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::Aborted => "aborted",
            Outcome::Panicked => "panicked",
        }
    }
}

/// Pipeline middleware factory
#[derive(Clone)]
pub struct Pipeline {
    pool: ContextPool,
    gate: Option<RateLimitGate>,
    chain: Chain,
    notify: Option<PanicNotifier>,
}

impl Pipeline {
    /// Empty pipeline drawing contexts from `pool`
    pub fn new(pool: ContextPool) -> Self {
        install_panic_hook();
        Self {
            pool,
            gate: None,
            chain: Chain::new(),
            notify: None,
        }
    }

    /// Reject requests the shared bucket has no token for, before the chain runs
    pub fn with_rate_limiter(mut self, bucket: Arc<TokenBucket>) -> Self {
        self.gate = Some(RateLimitGate::new(bucket));
        self
    }

    /// Append a middleware to the chain
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.chain = self.chain.with(middleware);
        self
    }

    /// Called once per contained panic. A panicking notifier is logged and ignored.
    pub fn on_panic<F>(mut self, notify: F) -> Self
    where
        F: Fn(&PanicReport) + Send + Sync + 'static,
    {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("pool", &self.pool)
            .field("rate_limited", &self.gate.is_some())
            .field("chain", &self.chain)
            .field("notify", &self.notify.is_some())
            .finish()
    }
}

impl<S, B> Transform<S, ServiceRequest> for Pipeline
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = PipelineMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PipelineMiddleware {
            service: Rc::new(service),
            pipeline: Rc::new(self.clone()),
        }))
    }
}

/// Pipeline middleware service
pub struct PipelineMiddleware<S> {
    service: Rc<S>,
    pipeline: Rc<Pipeline>,
}

impl<S, B> Service<ServiceRequest> for PipelineMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let pipeline = Rc::clone(&self.pipeline);

        Box::pin(async move {
            // Released back to the pool when dropped, panics included
            let mut ctx = pipeline.pool.acquire();
            ctx.begin(&req);

            let guarded = Guarded::new(dispatch(&pipeline, &mut ctx, service, req));
            let result = AssertUnwindSafe(guarded).catch_unwind().await;
            match result {
                Ok(Ok((res, outcome))) => {
                    let suppressed = res.request().extensions().contains::<AccessLogDisabled>();
                    if !suppressed {
                        access_log(&ctx, res.status(), outcome);
                    }
                    Ok(res)
                }
                Ok(Err(e)) => {
                    let e = localize_error(e, ctx.language());
                    access_log(&ctx, e.as_response_error().status_code(), Outcome::Handled);
                    Err(e)
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    let e = recover(&pipeline, &ctx, message);
                    access_log(&ctx, StatusCode::INTERNAL_SERVER_ERROR, Outcome::Panicked);
                    Err(e)
                }
            }
        })
    }
}

async fn dispatch<S, B>(
    pipeline: &Pipeline,
    ctx: &mut RequestContext,
    service: Rc<S>,
    req: ServiceRequest,
) -> Result<(ServiceResponse<BoxBody>, Outcome), Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    if let Some(gate) = &pipeline.gate {
        if gate.handle(ctx).await == Flow::Abort {
            return Ok((respond_from_context(ctx, req), Outcome::Aborted));
        }
    }

    if pipeline.chain.run(ctx).await == Flow::Abort {
        return Ok((respond_from_context(ctx, req), Outcome::Aborted));
    }

    if let Some(identity) = ctx.identity() {
        req.extensions_mut().insert(identity.clone());
    }

    // The router needs sole ownership of the request while it matches, so
    // nothing here may keep an `HttpRequest` clone across this call
    let res = service.call(req).await?.map_into_boxed_body();
    Ok((localize(res, ctx.language()), Outcome::Handled))
}

/// Response written into the context by the gate or a middleware
fn respond_from_context(ctx: &mut RequestContext, req: ServiceRequest) -> ServiceResponse<BoxBody> {
    let lang = ctx.language();
    let response = ctx.take_response().unwrap_or_else(|| {
        HttpResponse::InternalServerError().json(ApiError::InternalPanic.envelope(lang))
    });
    req.into_response(response)
}

/// Re-render an `ApiError` response in the caller's language
fn localize(res: ServiceResponse<BoxBody>, lang: Language) -> ServiceResponse<BoxBody> {
    if lang == Language::default() {
        return res;
    }
    let localized = res
        .response()
        .error()
        .and_then(|e| e.as_error::<ApiError>())
        .map(|e| HttpResponse::build(e.classify().0).json(e.envelope(lang)));

    match localized {
        Some(response) => res.into_response(response),
        None => res,
    }
}

/// Same as [`localize`] for errors the inner service returns instead of rendering
fn localize_error(err: Error, lang: Language) -> Error {
    if lang == Language::default() {
        return err;
    }
    let localized = err.as_error::<ApiError>().map(|e| {
        let response = HttpResponse::build(e.classify().0).json(e.envelope(lang));
        InternalError::from_response(e.to_string(), response)
    });

    match localized {
        Some(e) => e.into(),
        None => err,
    }
}

/// Log and report a contained panic; the error carries the prebuilt 500 response
fn recover(pipeline: &Pipeline, ctx: &RequestContext, message: String) -> Error {
    let captured = take_captured();
    tracing::error!(
        parent: ctx.span(),
        panic = %message,
        location = captured.location.as_deref().unwrap_or("unknown"),
        backtrace = %captured.backtrace,
        "Request handler panicked"
    );

    if let Some(notify) = &pipeline.notify {
        let report = PanicReport {
            request_id: ctx.request_id().to_string(),
            method: ctx.method().to_string(),
            path: ctx.path().to_string(),
            message,
            location: captured.location,
            backtrace: captured.backtrace,
        };
        if std::panic::catch_unwind(AssertUnwindSafe(|| notify(&report))).is_err() {
            tracing::error!(parent: ctx.span(), "Panic notifier panicked");
        }
    }

    let error = ApiError::InternalPanic;
    let response = HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
        .json(error.envelope(ctx.language()));
    InternalError::from_response(error, response).into()
}

fn access_log(ctx: &RequestContext, status: StatusCode, outcome: Outcome) {
    if ctx.is_log_disabled() {
        return;
    }
    let latency_ms = ctx
        .started_at()
        .map(|t| t.elapsed().as_millis() as u64)
        .unwrap_or_default();
    tracing::info!(
        parent: ctx.span(),
        status = status.as_u16(),
        latency_ms,
        outcome = outcome.as_str(),
        "Request completed"
    );
}
