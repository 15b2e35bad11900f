//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{"data": ...}`.
///
/// Failures are rendered by `AppError` itself.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Payload for endpoints that only acknowledge.
#[derive(Debug, Serialize)]
pub struct Done {
    /// Always `true`.
    pub success: bool,
}

/// `{"data": {"success": true}}`
#[must_use]
pub const fn done() -> ApiResponse<Done> {
    ApiResponse::ok(Done { success: true })
}
