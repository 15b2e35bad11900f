//! Posting endpoints.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::{AppError, AppResult};
use guarda_core::{CreatePostingInput, KnowledgeToggle, ToggleAction};
use serde::{Deserialize, Serialize};

use super::views::{IdRequest, PostingView};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Lookup by id or permalink.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPostingRequest {
    pub id: Option<String>,
    pub permalink: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostingsRequest {
    pub city_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRequest {
    pub posting_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostingView {
    pub message: &'static str,
    pub deleted_id: String,
    pub promoted_root_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeToggleView {
    pub action: ToggleAction,
    pub knowledge_count: u64,
    pub user_knows: bool,
    pub score: i32,
}

impl From<KnowledgeToggle> for KnowledgeToggleView {
    fn from(t: KnowledgeToggle) -> Self {
        Self {
            action: t.action,
            knowledge_count: t.knowledge_count,
            user_knows: t.user_knows,
            score: t.score,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/replies", post(replies))
        .route("/list", post(list))
        .route("/knowledge/toggle", post(toggle_knowledge))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostingInput>,
) -> AppResult<ApiResponse<PostingView>> {
    let posting = state.services.posting.create(&user.id, input).await?;
    Ok(ApiResponse::ok(posting.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<DeletePostingView>> {
    let result = state.services.posting.delete(&user.id, &req.id).await?;
    Ok(ApiResponse::ok(DeletePostingView {
        message: "Posting deleted",
        deleted_id: result.deleted_id,
        promoted_root_id: result.promoted_root_id,
    }))
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowPostingRequest>,
) -> AppResult<ApiResponse<PostingView>> {
    let posting = match (req.id, req.permalink) {
        (Some(id), _) => state.services.posting.get(&id).await?,
        (None, Some(permalink)) => state.services.posting.get_by_permalink(&permalink).await?,
        (None, None) => {
            return Err(AppError::BadRequest("id or permalink is required".to_string()));
        }
    };
    Ok(ApiResponse::ok(posting.into()))
}

async fn replies(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<Vec<PostingView>>> {
    let replies = state.services.posting.list_replies(&req.id).await?;
    Ok(ApiResponse::ok(replies.into_iter().map(Into::into).collect()))
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListPostingsRequest>,
) -> AppResult<ApiResponse<Vec<PostingView>>> {
    let postings = state.services.posting.list_by_city(&req.city_id).await?;
    Ok(ApiResponse::ok(postings.into_iter().map(Into::into).collect()))
}

async fn toggle_knowledge(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<KnowledgeRequest>,
) -> AppResult<ApiResponse<KnowledgeToggleView>> {
    let toggled = state
        .services
        .knowledge
        .toggle(&user.id, &req.posting_id)
        .await?;
    Ok(ApiResponse::ok(toggled.into()))
}
