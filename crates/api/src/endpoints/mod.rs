//! API endpoints.

mod admin;
mod cities;
mod comments;
mod likes;
mod me;
mod memories;
mod postings;
mod reports;
mod views;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/i", me::router())
        .nest("/cities", cities::router())
        .nest("/memories", memories::router())
        .nest("/postings", postings::router())
        .nest("/likes", likes::router())
        .nest("/comments", comments::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
}
