//! Response bodies for the REST services

use crate::album::ImageRef;
use serde::Serialize;

/// One listing element: `{ "img": ..., "exif": ... }`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImageUrls {
    pub img: String,
    pub exif: String,
}

impl From<&ImageRef> for ImageUrls {
    fn from(image: &ImageRef) -> Self {
        Self {
            img: image.display_url.clone(),
            exif: image.meta_url.clone(),
        }
    }
}
