//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 5000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Path to uploads directory (default: ./public/uploads).
    pub uploads_dir: PathBuf,

    /// Base URL for serving uploaded files (default: /uploads).
    pub files_url: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Shared secret for HS256 bearer tokens on write endpoints.
    pub jwt_secret: String,

    /// Per-statement timeout for listing queries (default: 10s).
    pub query_timeout: Duration,

    /// Upper bound applied to `pageSize` on listings (default: 100).
    pub max_page_size: u32,

    /// Maximum accepted upload size in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public/uploads"));

        let files_url = env::var("FILES_URL").unwrap_or_else(|_| "/uploads".to_string());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 characters");
        }

        let query_timeout_secs: u64 = env::var("QUERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("QUERY_TIMEOUT_SECS must be a valid u64")?;

        let max_page_size: u32 = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("MAX_PAGE_SIZE must be a valid u32")?;

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse()
            .context("MAX_UPLOAD_BYTES must be a valid usize")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            uploads_dir,
            files_url,
            cors_allowed_origins,
            jwt_secret,
            query_timeout: Duration::from_secs(query_timeout_secs.max(1)),
            max_page_size: max_page_size.max(1),
            max_upload_bytes,
        })
    }
}
