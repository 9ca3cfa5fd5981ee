//! HTTP surface of Tokengate: request pipeline, context pool, middlewares
//! and the token lifecycle routes.

pub mod app;
pub mod context;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
