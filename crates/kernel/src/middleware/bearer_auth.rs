//! Bearer token authentication middleware.
//!
//! Guards admin write endpoints: checks `Authorization: Bearer <token>`,
//! verifies the token, and stores the admin identity in request extensions.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ErrorBody;
use crate::state::AppState;

/// Identity of the admin behind a verified token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub uid: String,
    pub email: Option<String>,
}

/// Middleware that requires a valid admin bearer token.
///
/// Missing header or scheme is `token not provided`; a bad signature or an
/// expired token is `invalid or expired token`. Both are 401.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return unauthorized("token not provided");
    };

    let claims = match state.tokens().verify(token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %format!("{e:#}"), "rejected bearer token");
            return unauthorized("invalid or expired token");
        }
    };

    request.extensions_mut().insert(AdminUser {
        uid: claims.uid,
        email: claims.email,
    });

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
