//! Common type definitions shared across crates

pub mod language;
pub mod response;

pub use language::Language;
pub use response::JsonResponse;
