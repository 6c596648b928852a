//! Application state shared across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::db;
use crate::file::{FileStorage, ImageUploadService, LocalFileStorage};
use crate::listing::ShowPager;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Image uploads.
    images: ImageUploadService,

    /// Show listing executor.
    pager: ShowPager,

    /// Admin bearer token verifier.
    tokens: TokenVerifier,

    /// Directory served under `/uploads`.
    uploads_dir: PathBuf,

    /// Upper bound for `pageSize` on listings.
    max_page_size: u32,

    /// Largest accepted image upload.
    max_upload_bytes: usize,
}

impl AppState {
    /// Connect to the database, apply migrations, and build all services.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        tokio::fs::create_dir_all(&config.uploads_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create uploads directory {}",
                    config.uploads_dir.display()
                )
            })?;

        info!(uploads_dir = %config.uploads_dir.display(), "application state ready");

        Ok(Self::from_parts(db, config))
    }

    /// Build state around an existing pool without touching the database.
    ///
    /// Integration tests pass a lazily connected pool here.
    pub fn from_parts(db: PgPool, config: &Config) -> Self {
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(
            config.uploads_dir.clone(),
            config.files_url.clone(),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                images: ImageUploadService::new(storage, config.max_upload_bytes),
                pager: ShowPager::new(db.clone(), config.query_timeout),
                tokens: TokenVerifier::new(config.jwt_secret.as_bytes()),
                uploads_dir: config.uploads_dir.clone(),
                max_page_size: config.max_page_size,
                max_upload_bytes: config.max_upload_bytes,
                db,
            }),
        }
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the image upload service.
    pub fn images(&self) -> &ImageUploadService {
        &self.inner.images
    }

    /// Get the show listing executor.
    pub fn pager(&self) -> &ShowPager {
        &self.inner.pager
    }

    /// Get the admin token verifier.
    pub fn tokens(&self) -> &TokenVerifier {
        &self.inner.tokens
    }

    /// Directory holding uploaded files.
    pub fn uploads_dir(&self) -> &Path {
        &self.inner.uploads_dir
    }

    /// Upper bound for `pageSize` on listings.
    pub fn max_page_size(&self) -> u32 {
        self.inner.max_page_size
    }

    /// Largest accepted image upload, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}
