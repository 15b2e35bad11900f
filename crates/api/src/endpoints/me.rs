//! Current-profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use serde::Deserialize;

use super::views::{CityView, ProfileView};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Done, done},
};

/// Home city request. `null` clears it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeCityRequest {
    pub city_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub city_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(show))
        .route("/home-city", post(set_home_city))
        .route("/favorites/add", post(add_favorite))
        .route("/favorites/remove", post(remove_favorite))
        .route("/favorites/list", post(list_favorites))
}

/// The caller's profile, created on first sight by the auth middleware.
async fn show(AuthUser(user): AuthUser) -> AppResult<ApiResponse<ProfileView>> {
    Ok(ApiResponse::ok(user.into()))
}

async fn set_home_city(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<HomeCityRequest>,
) -> AppResult<ApiResponse<ProfileView>> {
    let profile = state
        .services
        .profile
        .set_home_city(&user.id, req.city_id)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}

async fn add_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<Done>> {
    state
        .services
        .profile
        .add_favorite_city(&user.id, &req.city_id)
        .await?;
    Ok(done())
}

async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<Done>> {
    state
        .services
        .profile
        .remove_favorite_city(&user.id, &req.city_id)
        .await?;
    Ok(done())
}

async fn list_favorites(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CityView>>> {
    let cities = state
        .services
        .profile
        .list_favorite_cities(&user.id)
        .await?;
    Ok(ApiResponse::ok(cities.into_iter().map(Into::into).collect()))
}
