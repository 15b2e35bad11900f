//! Like (curtida) endpoints.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub memory_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub memory_id: String,
    pub profile_id: String,
    pub created_at: String,
    pub like_count: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikeRequest>,
) -> AppResult<ApiResponse<LikeView>> {
    let like = state.services.like.create(&user.id, &req.memory_id).await?;
    let like_count = state.services.like.count(&req.memory_id).await?;

    Ok(ApiResponse::ok(LikeView {
        memory_id: like.memory_id,
        profile_id: like.profile_id,
        created_at: like.created_at.to_rfc3339(),
        like_count,
    }))
}

/// Returns the removed like.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikeRequest>,
) -> AppResult<ApiResponse<LikeView>> {
    let like = state.services.like.find(&user.id, &req.memory_id).await?;
    state.services.like.delete(&user.id, &req.memory_id).await?;
    let like_count = state.services.like.count(&req.memory_id).await?;

    Ok(ApiResponse::ok(LikeView {
        memory_id: like.memory_id,
        profile_id: like.profile_id,
        created_at: like.created_at.to_rfc3339(),
        like_count,
    }))
}
