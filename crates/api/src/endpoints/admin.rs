//! Admin endpoints. The services check the role.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use guarda_core::{Stats, parse_role};
use serde::{Deserialize, Serialize};

use super::views::{ProfileView, ReportView};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ListReportsRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportStatusRequest {
    pub report_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub profile_id: String,
    pub role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub memories: u64,
    pub postings: u64,
    pub profiles: u64,
    pub pending_reports: u64,
}

impl From<Stats> for StatsView {
    fn from(s: Stats) -> Self {
        Self {
            memories: s.memories,
            postings: s.postings,
            profiles: s.profiles,
            pending_reports: s.pending_reports,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/list", post(list_reports))
        .route("/reports/update-status", post(update_report_status))
        .route("/stats", post(stats))
        .route("/roles/set", post(set_role))
}

async fn list_reports(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListReportsRequest>,
) -> AppResult<ApiResponse<Vec<ReportView>>> {
    let reports = state
        .services
        .moderation
        .list_reports(&user.id, req.status.as_deref())
        .await?;
    Ok(ApiResponse::ok(reports.into_iter().map(Into::into).collect()))
}

async fn update_report_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateReportStatusRequest>,
) -> AppResult<ApiResponse<ReportView>> {
    let report = state
        .services
        .moderation
        .update_status(&user.id, &req.report_id, &req.status)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

async fn stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StatsView>> {
    let stats = state.services.moderation.stats(&user.id).await?;
    Ok(ApiResponse::ok(stats.into()))
}

async fn set_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<ProfileView>> {
    let role = parse_role(&req.role)?;
    let profile = state
        .services
        .profile
        .set_role(&user.id, &req.profile_id, role)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}
