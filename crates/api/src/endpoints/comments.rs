//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use guarda_core::target_from_ids;
use serde::Deserialize;

use super::views::{CommentView, IdRequest};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Done, done},
};

/// Exactly one of `memoryId` and `legacyPersonId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub memory_id: Option<String>,
    pub legacy_person_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(flatten)]
    pub target: TargetRequest,
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/list", post(list))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentView>> {
    let target = target_from_ids(req.target.memory_id, req.target.legacy_person_id)?;
    let comment = state
        .services
        .comment
        .create(&user.id, target, req.text)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<Done>> {
    state.services.comment.delete(&user.id, &req.id).await?;
    Ok(done())
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<TargetRequest>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let target = target_from_ids(req.memory_id, req.legacy_person_id)?;
    let comments = state.services.comment.list(&target).await?;
    Ok(ApiResponse::ok(comments.into_iter().map(Into::into).collect()))
}
