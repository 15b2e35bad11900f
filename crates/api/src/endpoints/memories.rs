//! Memory endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::NaiveDate;
use guarda_common::AppResult;
use guarda_core::{CreateMemoryInput, UpdateMemoryInput, parse_kind};
use guarda_db::repositories::MemoryFilter;
use serde::{Deserialize, Serialize};

use super::views::{IdRequest, MemoryView, RankedMemoryView};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Done, done},
};

#[derive(Debug, Deserialize)]
pub struct UpdateMemoryRequest {
    pub id: String,
    #[serde(flatten)]
    pub patch: UpdateMemoryInput,
}

/// City listing with optional filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMemoriesRequest {
    pub city_id: Option<String>,
    pub search: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub profession: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct RankedMemoriesView {
    pub podium: Vec<RankedMemoryView>,
    pub rest: Vec<RankedMemoryView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/list", post(list))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMemoryInput>,
) -> AppResult<ApiResponse<MemoryView>> {
    let memory = state.services.memory.create(&user.id, input).await?;
    Ok(ApiResponse::ok(memory.into()))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateMemoryRequest>,
) -> AppResult<ApiResponse<MemoryView>> {
    let memory = state
        .services
        .memory
        .update(&user.id, &req.id, req.patch)
        .await?;
    Ok(ApiResponse::ok(memory.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<Done>> {
    state.services.memory.delete(&user.id, &req.id).await?;
    Ok(done())
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<RankedMemoryView>> {
    let memory = state.services.memory.get(&req.id).await?;
    Ok(ApiResponse::ok(memory.into()))
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListMemoriesRequest>,
) -> AppResult<ApiResponse<RankedMemoriesView>> {
    let filter = MemoryFilter {
        search: req.search,
        kind: req.kind.as_deref().map(parse_kind).transpose()?,
        category: req.category,
        profession: req.profession,
        date_from: req.date_from,
        date_to: req.date_to,
    };

    let ranked = state
        .services
        .memory
        .list(req.city_id.as_deref(), &filter)
        .await?;

    Ok(ApiResponse::ok(RankedMemoriesView {
        podium: ranked.podium.into_iter().map(Into::into).collect(),
        rest: ranked.rest.into_iter().map(Into::into).collect(),
    }))
}
