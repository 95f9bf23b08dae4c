//! Integrity tag for an album listing, used as the listing ETag

use super::ImageRef;
use md5::{Digest, Md5};

const SEPARATOR: &str = ",";

/// MD5 over `display,meta` for every image, in order, hex encoded
pub fn integrity_tag(images: &[ImageRef]) -> String {
    let joined = images
        .iter()
        .flat_map(|img| [img.display_url.as_str(), img.meta_url.as_str()])
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    hex::encode(Md5::digest(joined.as_bytes()))
}
