//! # Media
//!
//! Uploaded files land in the uploads directory under a fresh name and are
//! served from [`PUBLIC_PREFIX`].
//!
//! - Images are re-encoded to lossy WebP at quality 90, shrunk to fit inside
//!   2000×2000 (never enlarged), written as `optimized-<stem>.webp`, and the
//!   original upload is removed
//! - Videos are kept byte-for-byte with their original extension
//! - Every upload is a new file, nothing is deduplicated or cleaned up later
use std::{fs, io, path::Path, sync::LazyLock};

use chrono::Utc;
use image::{DynamicImage, ImageError, ImageReader, imageops::FilterType};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "/uploads";
pub const MAX_DIMENSION: u32 = 2000;
pub const WEBP_QUALITY: f32 = 90.0;

static EXTENSION_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]").unwrap());

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image could not be decoded: {0}")]
    Decode(#[from] ImageError),

    #[error("WebP encoding failed: {0}")]
    Encode(String),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();

        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Sanitized lowercase extension of a client file name, with the dot.
pub fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSION_CHARS.replace_all(&ext.to_lowercase(), "").into_owned())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Fresh on-disk name for an upload, keeping the client's extension.
pub fn upload_name(file_name: Option<&str>) -> String {
    format!(
        "file-{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        file_name.map(extension).unwrap_or_default()
    )
}

pub fn public_url(file_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{file_name}")
}

/// Largest size fitting inside the bounding box, or `None` if already inside it.
pub fn fit_within(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }

    let scale = f64::min(max as f64 / width as f64, max as f64 / height as f64);
    let fitted = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max);

    Some((fitted(width), fitted(height)))
}

/// Re-encodes `source` into the uploads directory and removes `source`.
/// Returns the new file name. Blocking, run it off the async runtime.
pub fn optimize_image(source: &Path, uploads_dir: &Path) -> Result<String, MediaError> {
    let mut image = ImageReader::open(source)?.with_guessed_format()?.decode()?;

    if let Some((width, height)) = fit_within(image.width(), image.height(), MAX_DIMENSION) {
        image = image.resize_exact(width, height, FilterType::Lanczos3);
    }

    let image = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let encoded = webp::Encoder::from_image(&image)
        .map_err(|e| MediaError::Encode(e.to_string()))?
        .encode(WEBP_QUALITY);

    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("upload");
    let file_name = format!("optimized-{stem}.webp");
    let destination = uploads_dir.join(&file_name);

    fs::write(&destination, &*encoded)?;
    fs::remove_file(source)?;

    Ok(file_name)
}
