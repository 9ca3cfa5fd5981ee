pub mod auth;
pub mod chain;
pub mod cors;
pub mod pipeline;
pub mod rate_limit;
pub mod recovery;

pub use auth::*;
pub use chain::{Chain, Flow, Middleware};
pub use cors::create_cors;
pub use pipeline::{PanicReport, Pipeline, PipelineMiddleware};
pub use rate_limit::RateLimitGate;
