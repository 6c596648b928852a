//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::file::UploadError;
use crate::listing::FilterError;

/// Postgres SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(anyhow::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("query timed out")]
    Timeout,

    #[error("database error")]
    Database(sqlx::Error),
}

/// JSON error envelope returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// Shorthand for a validation failure with a client-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_statement_timeout(&e) {
            AppError::Timeout
        } else {
            AppError::Database(e)
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        // Context layers are transparent to downcast_ref.
        if let Some(db) = e.downcast_ref::<sqlx::Error>()
            && is_statement_timeout(db)
        {
            return AppError::Timeout;
        }
        AppError::Internal(e)
    }
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            UploadError::UnsupportedMedia(_) => AppError::UnsupportedMedia(e.to_string()),
            UploadError::Undecodable => AppError::Validation(e.to_string()),
            UploadError::Storage(inner) => AppError::Internal(inner),
        }
    }
}

/// True when Postgres cancelled the statement because of `statement_timeout`.
pub fn is_statement_timeout(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(QUERY_CANCELED),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the log; clients get a generic message.
        let error = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "internal server error");
                "internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            AppError::Timeout => {
                tracing::warn!("query exceeded statement timeout");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
