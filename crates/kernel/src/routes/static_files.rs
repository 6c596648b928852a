//! Uploaded file serving.

use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::warn;

use crate::state::AppState;

/// Create the uploads router.
pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{*path}", get(serve_upload))
}

/// Serve a file from the uploads directory.
async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let Some(file_path) = resolve(state.uploads_dir(), &path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %file_path.display(), error = %e, "failed to read uploaded file");
            }
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, mime_from_path(&file_path)),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        content,
    )
        .into_response()
}

/// Join `path` under `root`, refusing anything but plain name segments.
fn resolve(root: &FsPath, path: &str) -> Option<PathBuf> {
    let relative = FsPath::new(path.trim_start_matches('/'));
    if path.contains('\0') || relative.as_os_str().is_empty() {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn mime_from_path(path: &FsPath) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
