//! Image upload service.
//!
//! Validates uploaded images, re-encodes JPEG and PNG to shrink them, and
//! writes the result through a [`FileStorage`] backend.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::storage::{FileStorage, LocalFileStorage};

/// JPEG quality used when re-encoding uploads.
pub const JPEG_QUALITY: u8 = 70;

/// A stored image.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    /// Storage URI (`local://...`).
    pub uri: String,
    /// Public URL persisted on the owning row.
    pub url: String,
}

/// Rejected or failed upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("file type not allowed: {0}")]
    UnsupportedMedia(String),

    #[error("image data could not be decoded")]
    Undecodable,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Stores admin-uploaded images.
#[derive(Clone)]
pub struct ImageUploadService {
    storage: Arc<dyn FileStorage>,
    max_bytes: usize,
}

impl ImageUploadService {
    pub fn new(storage: Arc<dyn FileStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn storage(&self) -> &Arc<dyn FileStorage> {
        &self.storage
    }

    /// Validate, compress and store an image.
    ///
    /// The content type is taken from the bytes themselves; `declared_mime`
    /// only has to agree that the upload is an image.
    pub async fn store(
        &self,
        folder: &str,
        prefix: &str,
        original_name: &str,
        declared_mime: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, UploadError> {
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        if !declared_mime.starts_with("image/") {
            return Err(UploadError::UnsupportedMedia(declared_mime.to_string()));
        }

        let Some(kind) = infer::get(&bytes) else {
            return Err(UploadError::UnsupportedMedia(declared_mime.to_string()));
        };
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(UploadError::UnsupportedMedia(kind.mime_type().to_string()));
        }

        let original_size = bytes.len();
        let mime = kind.mime_type();
        let data = tokio::task::spawn_blocking(move || recompress(bytes, mime))
            .await
            .context("image compression task failed")??;

        let uri = LocalFileStorage::generate_uri(folder, prefix, kind.extension());
        self.storage
            .write(&uri, &data)
            .await
            .context("failed to write image to storage")?;
        let url = self.storage.public_url(&uri);

        info!(
            original = %original_name,
            uri = %uri,
            mime = %mime,
            original_size,
            stored_size = data.len(),
            "image stored"
        );

        Ok(StoredImage { uri, url })
    }

    /// Remove the file behind a public URL.
    ///
    /// Failures are logged and swallowed; a stale file never blocks the
    /// database change that orphaned it.
    pub async fn delete_by_url(&self, url: &str) {
        let Some(uri) = self.storage.uri_for_url(url) else {
            debug!(url = %url, "url not owned by storage, skipping delete");
            return;
        };
        if let Err(e) = self.storage.delete(&uri).await {
            warn!(url = %url, error = %e, "failed to delete stored file");
        }
    }

    /// Delete the file behind an optional URL.
    pub async fn delete_if_some(&self, url: Option<&str>) {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.delete_by_url(url).await;
        }
    }
}

impl std::fmt::Debug for ImageUploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploadService")
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

/// Re-encode JPEG at [`JPEG_QUALITY`] and PNG at best compression.
/// Other image types pass through unchanged.
fn recompress(bytes: Vec<u8>, mime: &str) -> Result<Vec<u8>, UploadError> {
    let format = match mime {
        "image/jpeg" => ImageFormat::Jpeg,
        "image/png" => ImageFormat::Png,
        _ => return Ok(bytes),
    };

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|_| UploadError::Undecodable)?;

    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            image::DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .context("failed to encode jpeg")?;
        }
        _ => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)
                .context("failed to encode png")?;
        }
    }

    Ok(buf.into_inner())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([10, 200, 10]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    fn service(dir: &std::path::Path, max: usize) -> ImageUploadService {
        ImageUploadService::new(Arc::new(LocalFileStorage::new(dir, "/uploads")), max)
    }

    #[tokio::test]
    async fn stores_png_under_folder() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024 * 1024);

        let stored = svc
            .store("banners", "banner", "b.png", "image/png", png_bytes())
            .await
            .unwrap();

        assert!(stored.uri.starts_with("local://banners/banner-"));
        assert!(stored.url.starts_with("/uploads/banners/banner-"));
        assert!(stored.url.ends_with(".png"));
        assert!(svc.storage().exists(&stored.uri).await.unwrap());
    }

    #[tokio::test]
    async fn recompressed_jpeg_is_still_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024 * 1024);

        let stored = svc
            .store("shows", "flyer", "f.jpg", "image/jpeg", jpeg_bytes())
            .await
            .unwrap();
        let data = svc.storage().read(&stored.uri).await.unwrap();
        assert_eq!(infer::get(&data).map(|k| k.mime_type()), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn oversize_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 10);
        let err = svc
            .store("", "logo", "l.png", "image/png", png_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { max: 10, .. }));
    }

    #[tokio::test]
    async fn non_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024);

        let err = svc
            .store("", "logo", "x.txt", "text/plain", b"hello".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedMedia(_)));

        // Declared as an image but the bytes are a PDF.
        let err = svc
            .store("", "logo", "x.png", "image/png", b"%PDF-1.4 junk".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedMedia(_)));
    }

    #[tokio::test]
    async fn truncated_png_is_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024 * 1024);
        let mut bytes = png_bytes();
        bytes.truncate(20);

        let err = svc
            .store("", "logo", "x.png", "image/png", bytes)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Undecodable));
    }

    #[tokio::test]
    async fn delete_by_url_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024 * 1024);
        let stored = svc
            .store("", "logo", "l.png", "image/png", png_bytes())
            .await
            .unwrap();

        svc.delete_by_url(&stored.url).await;
        assert!(!svc.storage().exists(&stored.uri).await.unwrap());

        // Foreign and already-deleted URLs are ignored.
        svc.delete_by_url("https://elsewhere.example/x.png").await;
        svc.delete_by_url(&stored.url).await;
    }
}
