//! DAV access to the remote photo album
//!
//! `client` performs the outbound requests, `listing` turns a PROPFIND
//! multistatus reply into album entries.

pub mod client;
pub mod listing;

pub use client::DavClient;
pub use listing::{parse_listing, AlbumEntry, Listing};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DavError {
    #[error("DAV request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("DAV server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(&'static str),
    #[error("Expected {expected}, server declared '{found}'")]
    ContentType { expected: &'static str, found: String },
    #[error("Response body exceeded {limit} bytes")]
    BodyTooLarge { limit: u64 },
}
