//! JPEG thumbnail transcoding
//!
//! Decode, auto-orient from EXIF, resize to cover the target box, re-encode.
//! The output is always exactly `width × height`: the image is scaled until
//! it covers the box and the overflow is cropped around the center.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
    #[error("transcode worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// EXIF orientation tag (1..=8) of the primary image, if any
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Physically rotate/mirror pixels so the image displays upright
pub fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => img.fliph(),
        Some(3) => img.rotate180(),
        Some(4) => img.flipv(),
        Some(5) => img.rotate90().fliph(),
        Some(6) => img.rotate90(),
        Some(7) => img.rotate270().fliph(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}

pub fn transcode_jpeg(bytes: &[u8], opts: &TranscodeOptions) -> Result<Vec<u8>, TranscodeError> {
    let img = image::load_from_memory(bytes).map_err(TranscodeError::Decode)?;
    let orientation = read_orientation(bytes);
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        ?orientation,
        "decoded album image"
    );

    let upright = apply_orientation(img, orientation);
    let resized = upright.resize_to_fill(opts.width, opts.height, FilterType::Lanczos3);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, opts.quality);
    rgb.write_with_encoder(encoder).map_err(TranscodeError::Encode)?;

    Ok(out)
}

/// Run [`transcode_jpeg`] on the blocking pool
pub async fn transcode_jpeg_blocking(
    bytes: Vec<u8>,
    opts: TranscodeOptions,
) -> Result<Vec<u8>, TranscodeError> {
    tokio::task::spawn_blocking(move || transcode_jpeg(&bytes, &opts))
        .await
        .map_err(|e| TranscodeError::Worker(e.to_string()))?
}

#[cfg(test)]
pub(crate) fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 4) as u8, (y * 4) as u8, 128])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}

/// Insert an APP1 Exif segment carrying only an Orientation tag after SOI
#[cfg(test)]
pub(crate) fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    // tag 0x0112, SHORT, count 1, value left-justified
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = b"Exif\x00\x00".to_vec();
    app1.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
