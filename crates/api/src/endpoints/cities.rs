//! City endpoints. Public.

use axum::{Json, Router, extract::State, routing::post};
use guarda_common::AppResult;
use serde::Deserialize;

use super::views::CityView;
use crate::{middleware::AppState, response::ApiResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCitiesRequest {
    pub state_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShowCityRequest {
    pub slug: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/show", post(show))
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCitiesRequest>,
) -> AppResult<ApiResponse<Vec<CityView>>> {
    let cities = state.services.city.list(req.state_id.as_deref()).await?;
    Ok(ApiResponse::ok(cities.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowCityRequest>,
) -> AppResult<ApiResponse<CityView>> {
    let city = state.services.city.get_by_slug(&req.slug).await?;
    Ok(ApiResponse::ok(city.into()))
}
