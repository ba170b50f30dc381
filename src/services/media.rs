//! Media storage for uploaded images
//!
//! Uploads are downscaled to the configured maximum dimension and
//! re-encoded as JPEG before they are written under the media root as
//! `<kind>/<YYYY>/<MM>/<DD>/<uuid>.<ext>`. Undecodable uploads are stored
//! unchanged.

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::DomainError;

pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Artwork,
    Collection,
    BlogPreview,
}

impl MediaKind {
    fn dir(self) -> &'static str {
        match self {
            MediaKind::Artwork => "artworks",
            MediaKind::Collection => "collections",
            MediaKind::BlogPreview => "blog",
        }
    }
}

/// Downscale so the longer side is at most `max_dimension` and encode as JPEG
pub fn preprocess(data: &[u8], max_dimension: u32) -> Result<Vec<u8>, image::ImageError> {
    let mut img = image::load_from_memory(data)?;
    if img.width() > max_dimension || img.height() > max_dimension {
        img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    }

    let rgb = img.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(buffer.into_inner())
}

fn original_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_dimension: u32,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, max_dimension: u32) -> Self {
        Self {
            root: root.into(),
            max_dimension,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an upload, returning its path relative to the media root
    pub async fn store(
        &self,
        kind: MediaKind,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<String, DomainError> {
        let max_dimension = self.max_dimension;
        let (original, processed) = tokio::task::spawn_blocking(move || {
            let processed = preprocess(&data, max_dimension);
            (data, processed)
        })
        .await
        .map_err(|e| DomainError::Internal(format!("image task failed: {}", e)))?;

        let (bytes, extension) = match processed {
            Ok(jpeg) => (jpeg, "jpg".to_string()),
            Err(e) => {
                tracing::warn!("Image processing failed for {}, storing original: {}", file_name, e);
                (original, original_extension(file_name))
            }
        };

        let relative = format!(
            "{}/{}/{}.{}",
            kind.dir(),
            Utc::now().format("%Y/%m/%d"),
            Uuid::new_v4(),
            extension
        );
        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        tracing::debug!("Stored media file {}", relative);
        Ok(relative)
    }

    /// Best-effort removal of a stored file
    pub async fn remove(&self, relative: &str) {
        if relative.split('/').any(|part| part == "..") {
            tracing::warn!("Refusing to remove media path {}", relative);
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            tracing::warn!("Could not remove media file {}: {}", relative, e);
        }
    }
}
