//! Album listing service: `GET /`

use crate::api::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::error::AppError;
use super::types::ImageUrls;

pub fn listing_routes() -> Router<AppState> {
    Router::new().route("/", get(list_album))
}

async fn list_album(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let listing = state.album.list_images().await?;
    let etag = format!("\"{}\"", listing.tag);

    if if_none_match(&headers, &listing.tag) {
        tracing::debug!(etag = %etag, "listing unchanged");
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let urls: Vec<ImageUrls> = listing.images.iter().map(ImageUrls::from).collect();
    Ok(([(header::ETAG, etag)], Json(urls)).into_response())
}

/// True if `If-None-Match` names the current tag (quoted, weak or bare) or `*`
fn if_none_match(headers: &HeaderMap, tag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|candidate| {
            let candidate = candidate.trim();
            let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
            candidate.trim_matches('"')
        })
        .any(|candidate| candidate == "*" || candidate == tag)
}
