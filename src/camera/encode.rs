//! Frame normalization for upload: every captured frame is resized to the
//! fixed 640×480 the service expects, re-encoded as JPEG at quality 0.7,
//! and wrapped as a base64 data URL.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;
/// 0.7 on the canvas quality scale the detection service was tuned against.
pub const JPEG_QUALITY: u8 = 70;

/// CPU-bound; run on the blocking pool.
pub fn to_data_url(raw: &[u8]) -> Result<String> {
    let decoded = image::load_from_memory(raw).context("failed to decode captured frame")?;
    let frame = if decoded.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
        decoded
    } else {
        decoded.resize_exact(FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle)
    };

    let rgb = frame.to_rgb8();
    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .context("failed to encode frame as jpeg")?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}
