//! Report endpoints.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use guarda_core::CreateReportInput;

use super::views::ReportView;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReportInput>,
) -> AppResult<ApiResponse<ReportView>> {
    let report = state
        .services
        .moderation
        .create_report(&user.id, input)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}
