//! Site-wide singleton routes: settings, colors, info and the public
//! generals aggregate.
//!
//! Each singleton is read with GET and partially updated with an admin
//! PUT; a PUT that sets nothing is rejected.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Colors, Generals, Info, Settings, UpdateColors, UpdateInfo, UpdateSettings};
use crate::routes::helpers::admin;
use crate::state::AppState;

/// Create the router for site-wide singletons.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(get_settings).merge(admin(state, put(update_settings))),
        )
        .route(
            "/colors",
            get(get_colors).merge(admin(state, put(update_colors))),
        )
        .route("/info", get(get_info).merge(admin(state, put(update_info))))
        .route("/generals", get(get_generals))
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    Ok(Json(Settings::get(state.db()).await?.unwrap_or_default()))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdateSettings>,
) -> AppResult<Json<Settings>> {
    if input.is_empty() {
        return Err(AppError::validation("no settings fields to update"));
    }
    let input = input.normalized().map_err(AppError::validation)?;

    let settings = Settings::update(state.db(), &input)
        .await?
        .ok_or(AppError::NotFound("settings"))?;

    info!("settings updated");
    Ok(Json(settings))
}

async fn get_colors(State(state): State<AppState>) -> AppResult<Json<Colors>> {
    Ok(Json(Colors::get(state.db()).await?.unwrap_or_default()))
}

async fn update_colors(
    State(state): State<AppState>,
    Json(input): Json<UpdateColors>,
) -> AppResult<Json<Colors>> {
    if input.is_empty() {
        return Err(AppError::validation("no color fields to update"));
    }

    let colors = Colors::update(state.db(), &input)
        .await?
        .ok_or(AppError::NotFound("colors"))?;

    info!(primary = ?colors.primary_color, "colors updated");
    Ok(Json(colors))
}

async fn get_info(State(state): State<AppState>) -> AppResult<Json<Info>> {
    Info::get(state.db())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("info"))
}

async fn update_info(
    State(state): State<AppState>,
    Json(input): Json<UpdateInfo>,
) -> AppResult<Json<Info>> {
    if input.is_empty() {
        return Err(AppError::validation("no info fields to update"));
    }

    let info = Info::update(state.db(), &input)
        .await?
        .ok_or(AppError::NotFound("info"))?;

    info!("info updated");
    Ok(Json(info))
}

async fn get_generals(State(state): State<AppState>) -> AppResult<Json<Generals>> {
    Ok(Json(Generals::get(state.db()).await?))
}
