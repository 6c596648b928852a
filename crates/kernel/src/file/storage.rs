//! File storage backends.
//!
//! Uploaded images are addressed by `local://` URIs relative to the uploads
//! directory and exposed under a public base URL.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// File storage backend trait.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write data to storage at the given URI.
    async fn write(&self, uri: &str, data: &[u8]) -> Result<()>;

    /// Read data from storage at the given URI.
    async fn read(&self, uri: &str) -> Result<Vec<u8>>;

    /// Delete a file from storage. A missing file is not an error.
    async fn delete(&self, uri: &str) -> Result<()>;

    /// Check if a file exists.
    async fn exists(&self, uri: &str) -> Result<bool>;

    /// Get the public URL for a file.
    fn public_url(&self, uri: &str) -> String;

    /// Map a public URL produced by [`FileStorage::public_url`] back to its
    /// storage URI. Returns `None` for URLs this backend does not own.
    fn uri_for_url(&self, url: &str) -> Option<String>;
}

/// Local filesystem storage.
pub struct LocalFileStorage {
    /// Base path for file storage.
    base_path: PathBuf,
    /// Base URL for public file access.
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
        }
    }

    /// Parse a local:// URI to get the on-disk path.
    ///
    /// Rejects paths containing `..` or absolute components.
    fn parse_uri(&self, uri: &str) -> Result<PathBuf> {
        let path = uri
            .strip_prefix("local://")
            .context("invalid local URI, must start with local://")?;
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            anyhow::bail!("directory traversal not allowed in storage URI");
        }
        Ok(self.base_path.join(relative))
    }

    /// Generate a storage URI for a new file.
    ///
    /// Produces `local://<folder>/<prefix>-<unix millis>-<short id>.<ext>`;
    /// an empty folder puts the file at the root of the uploads directory.
    pub fn generate_uri(folder: &str, prefix: &str, ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let unique_id = uuid::Uuid::now_v7().simple().to_string();
        let short = &unique_id[unique_id.len() - 8..];
        let name = format!("{}-{millis}-{short}.{ext}", sanitize_segment(prefix));

        let folder = sanitize_segment(folder.trim_matches('/'));
        if folder.is_empty() {
            format!("local://{name}")
        } else {
            format!("local://{folder}/{name}")
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write(&self, uri: &str, data: &[u8]) -> Result<()> {
        let path = self.parse_uri(uri)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("failed to create directories")?;
        }

        let mut file = fs::File::create(&path)
            .await
            .context("failed to create file")?;
        file.write_all(data).await.context("failed to write file")?;
        file.flush().await.context("failed to flush file")?;

        debug!(uri = %uri, path = ?path, size = data.len(), "file written");
        Ok(())
    }

    async fn read(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.parse_uri(uri)?;
        let data = fs::read(&path).await.context("failed to read file")?;
        Ok(data)
    }

    async fn delete(&self, uri: &str) -> Result<()> {
        let path = self.parse_uri(uri)?;

        match fs::remove_file(&path).await {
            Ok(()) => debug!(uri = %uri, "file deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(uri = %uri, "file not found for deletion");
            }
            Err(e) => return Err(e).context("failed to delete file"),
        }

        Ok(())
    }

    async fn exists(&self, uri: &str) -> Result<bool> {
        let path = self.parse_uri(uri)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, uri: &str) -> String {
        let path = uri.strip_prefix("local://").unwrap_or(uri);
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn uri_for_url(&self, url: &str) -> Option<String> {
        let base = self.base_url.trim_end_matches('/');
        // Older rows hold absolute URLs (`http://host/uploads/...`).
        let rest = match url.strip_prefix(base) {
            Some(rest) => rest,
            None => {
                let marker = format!("{base}/");
                let at = url.find(&marker)?;
                &url[at + base.len()..]
            }
        };
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() {
            return None;
        }
        Some(format!("local://{rest}"))
    }
}

impl std::fmt::Debug for LocalFileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFileStorage")
            .field("base_path", &self.base_path)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Keep only characters that are safe in a path segment.
fn sanitize_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .take(64)
        .collect()
}
