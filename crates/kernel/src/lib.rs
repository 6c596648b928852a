//! Cartelera kernel library.
//!
//! Exposes the router and its services for the `cartelera` binary and for
//! integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Room for the non-file parts of a multipart form on top of the image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router with all routes and shared layers.
///
/// CORS is left to the caller since it depends on deployment config.
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::show::router(&state))
        .merge(routes::venue::router(&state))
        .merge(routes::section::router(&state))
        .merge(routes::banner::router(&state))
        .merge(routes::branding::router(&state))
        .merge(routes::settings::router(&state))
        .merge(routes::static_files::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
