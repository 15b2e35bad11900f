//! HTTP API layer for Guarda Memória.
//!
//! POST JSON endpoints with camelCase bodies. Successful responses are
//! wrapped as `{"data": ...}`; failures are rendered by `AppError`.
//!
//! Built on Axum 0.8. The auth middleware verifies bearer identity tokens
//! and resolves them to profiles before handlers run.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, TokenVerifier};
