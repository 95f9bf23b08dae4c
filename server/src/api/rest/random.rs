//! Random thumbnail service: `GET /`

use crate::api::AppState;
use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};

use super::error::AppError;

pub fn random_routes() -> Router<AppState> {
    Router::new().route("/", get(random_image))
}

async fn random_image(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let jpeg = state.album.random_jpeg().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        jpeg,
    ))
}
