//! Section ("sección") routes.
//!
//! JSON bodies are read as loose values so that numbers sent as strings
//! are accepted and malformed ones give a field-specific message.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::Value;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::section::{VALID_PADRES, normalize_padre};
use crate::models::{CreateSection, Section, UpdateSection};
use crate::routes::helpers::{admin, json_i32, json_text};
use crate::state::AppState;

/// Create the section router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/secciones",
            get(list_sections).merge(admin(state, post(create_section))),
        )
        .route(
            "/secciones/{id}",
            get(get_section).merge(admin(
                state,
                put(update_section).delete(delete_section),
            )),
        )
        .route("/secciones/padre/{padre}", get(list_by_parent))
}

fn padre_or_400(raw: &str) -> AppResult<String> {
    normalize_padre(raw).ok_or_else(|| {
        AppError::validation(format!(
            "'seccion_padre' must be one of: {}",
            VALID_PADRES.join(", ")
        ))
    })
}

fn create_input(body: &Value) -> AppResult<CreateSection> {
    Ok(CreateSection {
        nombre: json_text(body, "nombre"),
        seccion_padre: json_text(body, "seccion_padre"),
        seccion_order: json_i32(body, "seccion_order")?,
    })
}

fn update_input(body: &Value) -> AppResult<UpdateSection> {
    let seccion_padre = json_text(body, "seccion_padre")
        .map(|p| padre_or_400(&p))
        .transpose()?;

    Ok(UpdateSection {
        nombre: json_text(body, "nombre"),
        seccion_padre,
        seccion_order: json_i32(body, "seccion_order")?,
    })
}

async fn list_sections(State(state): State<AppState>) -> AppResult<Json<Vec<Section>>> {
    Ok(Json(Section::list_all(state.db()).await?))
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Section>> {
    Section::find_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("section"))
}

async fn list_by_parent(
    State(state): State<AppState>,
    Path(padre): Path<String>,
) -> AppResult<Json<Vec<Section>>> {
    let padre = padre_or_400(&padre)?;
    Ok(Json(Section::list_by_parent(state.db(), &padre).await?))
}

async fn create_section(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<Section>)> {
    let input = create_input(&body)?;
    let nombre = input
        .nombre
        .ok_or_else(|| AppError::validation("'nombre' is required"))?;
    let padre = padre_or_400(input.seccion_padre.as_deref().unwrap_or_default())?;

    let section =
        Section::create(state.db(), &nombre, &padre, input.seccion_order.unwrap_or(0)).await?;

    info!(section_id = section.id, nombre = %section.nombre, padre = %section.seccion_padre, "section created");
    Ok((StatusCode::CREATED, Json(section)))
}

async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> AppResult<Json<Section>> {
    let input = update_input(&body)?;

    let section = Section::update(state.db(), id, &input)
        .await?
        .ok_or(AppError::NotFound("section"))?;

    info!(section_id = id, "section updated");
    Ok(Json(section))
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Section>> {
    let section = Section::delete(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("section"))?;

    info!(section_id = id, "section deleted");
    Ok(Json(section))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_accepts_string_order() {
        let input = create_input(&json!({"nombre": "Bares", "seccion_padre": "Salir", "seccion_order": "3"}))
            .unwrap();
        assert_eq!(input.nombre.as_deref(), Some("Bares"));
        assert_eq!(input.seccion_order, Some(3));
    }

    #[test]
    fn create_rejects_bad_order() {
        assert!(create_input(&json!({"nombre": "Bares", "seccion_order": "tres"})).is_err());
    }

    #[test]
    fn update_validates_padre() {
        assert!(update_input(&json!({"seccion_padre": "viajar"})).is_err());

        let input = update_input(&json!({"seccion_padre": " DORMIR "})).unwrap();
        assert_eq!(input.seccion_padre.as_deref(), Some("dormir"));
        assert_eq!(input.nombre, None);
        assert_eq!(input.seccion_order, None);
    }

    #[test]
    fn padre_error_lists_valid_values() {
        let err = padre_or_400("x").unwrap_err();
        assert!(err.to_string().contains("salir, comer"));
    }
}
