//! Album listing and random thumbnail pipelines
//!
//! `AlbumService` composes the DAV client, the listing parser and the
//! classifiers. Each call is independent; nothing is cached between calls.

pub mod classify;
pub mod etag;
pub mod pick;

pub use classify::{classify_images, entry_name, ImageRef};
pub use etag::integrity_tag;
pub use pick::{choose_entry, eligible_entries};

use crate::config::Config;
use crate::dav::{parse_listing, AlbumEntry, DavClient, DavError, Listing};
use crate::imaging::{transcode_jpeg_blocking, TranscodeError, TranscodeOptions};
use thiserror::Error;

const JPEG_CONTENT_TYPE: &str = "image/jpeg";
/// Bytes of an unexpected DAV reply kept for logging
const MAX_ERROR_BODY: usize = 512;

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("Album '{0}' could not be found")]
    NotFound(String),
    #[error("Album '{0}' contains no images.")]
    EmptyAlbum(String),
    /// Entries exist but none has an image content type
    #[error("Album '{0}' contains no images.")]
    NoImages(String),
    #[error("No jpg images found in album '{0}'")]
    NoJpegImages(String),
    #[error("DAV server answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Unexpected listing: {0}")]
    UnexpectedListing(String),
    #[error(transparent)]
    Remote(#[from] DavError),
    #[error("Expected image/jpeg for '{name}', server declared '{content_type}'")]
    ContentType { name: String, content_type: String },
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

/// Images of the album plus the tag identifying this exact listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumListing {
    pub images: Vec<ImageRef>,
    pub tag: String,
}

pub struct AlbumService {
    dav: DavClient,
    album: String,
    transcode: TranscodeOptions,
}

impl AlbumService {
    pub fn new(config: &Config) -> Result<Self, DavError> {
        Ok(Self {
            dav: DavClient::new(config)?,
            album: config.album.clone(),
            transcode: TranscodeOptions {
                width: config.resize_width,
                height: config.resize_height,
                quality: config.jpeg_quality,
            },
        })
    }

    /// List the album and turn every outcome other than entries into an error
    pub async fn load_entries(&self) -> Result<Vec<AlbumEntry>, AlbumError> {
        let resp = self.dav.list().await?;
        let status = resp.status.as_u16();

        match parse_listing(status, &resp.body) {
            Listing::Entries(entries) => {
                tracing::debug!(album = %self.album, count = entries.len(), "album listed");
                Ok(entries)
            }
            Listing::NotFound => Err(AlbumError::NotFound(self.album.clone())),
            Listing::Empty => Err(AlbumError::EmptyAlbum(self.album.clone())),
            Listing::Unexpected(detail) if status != 207 => {
                let content_type = resp.headers.get(reqwest::header::CONTENT_TYPE);
                tracing::warn!(status, ?content_type, %detail, "unexpected DAV status");
                Err(AlbumError::UnexpectedStatus {
                    status,
                    body: truncate_detail(&resp.body, MAX_ERROR_BODY),
                })
            }
            Listing::Unexpected(detail) => Err(AlbumError::UnexpectedListing(detail)),
        }
    }

    pub async fn list_images(&self) -> Result<AlbumListing, AlbumError> {
        let entries = self.load_entries().await?;
        let images = classify_images(&entries);
        if images.is_empty() {
            return Err(AlbumError::NoImages(self.album.clone()));
        }

        let tag = integrity_tag(&images);
        tracing::debug!(
            images = ?images.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            %tag,
            "classified album images"
        );
        Ok(AlbumListing { images, tag })
    }

    /// Pick one `.jpg`/`.jpeg` entry at random and return it as a resized JPEG
    pub async fn random_jpeg(&self) -> Result<Vec<u8>, AlbumError> {
        let entries = self.load_entries().await?;
        let eligible = eligible_entries(&entries);

        let name = {
            let mut rng = rand::rng();
            match choose_entry(&eligible, &mut rng) {
                Some(entry) => entry_name(&entry.href).to_string(),
                None => return Err(AlbumError::NoJpegImages(self.album.clone())),
            }
        };

        tracing::info!(album = %self.album, image = %name, "picked random image");
        let fetched = match self.dav.fetch(&name, JPEG_CONTENT_TYPE).await {
            Ok(fetched) => fetched,
            Err(DavError::ContentType { found, .. }) => {
                return Err(AlbumError::ContentType {
                    name,
                    content_type: found,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let jpeg = transcode_jpeg_blocking(fetched.bytes, self.transcode).await?;
        Ok(jpeg)
    }
}

/// Cut `body` to at most `max` bytes on a char boundary
fn truncate_detail(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &body[..end], body.len())
}
