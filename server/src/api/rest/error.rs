//! Error handling for REST API
//!
//! Every failure leaves a handler as an `AppError`, rendered as
//! `{"error": "..."}` with a 404 or 500 status.

use crate::album::AlbumError;
use crate::dav::DavError;
use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    /// Public message plus the detail that is only logged
    Internal { message: String, details: String },
}

impl AppError {
    fn internal(message: &str, details: impl ToString) -> Self {
        AppError::Internal {
            message: message.to_string(),
            details: details.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal { message, details } => {
                tracing::error!(details = %details, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

impl From<AlbumError> for AppError {
    fn from(err: AlbumError) -> Self {
        match err {
            AlbumError::NotFound(_)
            | AlbumError::EmptyAlbum(_)
            | AlbumError::NoImages(_)
            | AlbumError::NoJpegImages(_) => AppError::NotFound(err.to_string()),
            AlbumError::UnexpectedStatus { .. } => {
                AppError::internal("Unknown response from DAV server", &err)
            }
            AlbumError::UnexpectedListing(_) => {
                AppError::internal("Unexpected error fetching the album images.", &err)
            }
            AlbumError::Remote(DavError::Transport(_)) | AlbumError::Remote(DavError::InvalidMethod(_)) => {
                AppError::internal("Failed to make request", &err)
            }
            AlbumError::Remote(_) | AlbumError::ContentType { .. } | AlbumError::Transcode(_) => {
                AppError::internal("Failed to load image", &err)
            }
        }
    }
}
