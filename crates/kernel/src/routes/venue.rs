//! Venue ("lugar") routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Venue, VenueInput};
use crate::routes::helpers::{FormData, admin, store_optional};
use crate::state::AppState;

/// Logos live at the uploads root.
const LOGO_FOLDER: &str = "";

/// Create the venue router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/lugares",
            get(list_venues).merge(admin(state, post(create_venue))),
        )
        .route(
            "/lugares/{id}",
            get(get_venue).merge(admin(
                state,
                put(update_venue).delete(delete_venue),
            )),
        )
        .route("/lugares/by-seccion-padre/{padre}", get(list_by_parent))
        .route(
            "/lugares/by-seccion-padre/{padre}/seccion_nombre/{nombre}",
            get(list_by_parent_and_section),
        )
}

async fn list_venues(State(state): State<AppState>) -> AppResult<Json<Vec<Venue>>> {
    Ok(Json(Venue::list_all(state.db()).await?))
}

async fn get_venue(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Venue>> {
    Venue::find_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("venue"))
}

async fn list_by_parent(
    State(state): State<AppState>,
    Path(padre): Path<String>,
) -> AppResult<Json<Vec<Venue>>> {
    Ok(Json(Venue::list_by_parent(state.db(), padre.trim()).await?))
}

/// An empty result is a 404 here, unlike the other listings.
async fn list_by_parent_and_section(
    State(state): State<AppState>,
    Path((padre, nombre)): Path<(String, String)>,
) -> AppResult<Json<Vec<Venue>>> {
    let venues = Venue::list_by_parent_and_section(state.db(), padre.trim(), nombre.trim()).await?;
    if venues.is_empty() {
        return Err(AppError::NotFound("venues for section"));
    }
    Ok(Json(venues))
}

/// Venue fields from a multipart form.
///
/// `lugares_order` falls back to 0 and an unparseable `seccion_id` detaches
/// the venue from its section.
fn venue_input(form: &FormData) -> AppResult<VenueInput> {
    Ok(VenueInput {
        nombre: form.required("nombre")?,
        direccion: form.text("direccion"),
        link_direccion: form.text("link_direccion"),
        telefono: form.text("telefono"),
        descripcion: form.text("descripcion"),
        reservas: form.text("reservas"),
        menu: form.text("menu"),
        delivery: form.text("delivery"),
        web: form.text("web"),
        is_featured: form.bool("is_featured").unwrap_or(false),
        instagram: form.text("instagram"),
        youtube: form.text("youtube"),
        seccion_id: form.text("seccion_id").and_then(|v| v.parse().ok()),
        lugares_order: form.int_or_zero("lugares_order"),
        logo_url: None,
    })
}

async fn create_venue(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Venue>)> {
    let mut form = FormData::from_multipart(multipart).await?;
    let mut input = venue_input(&form)?;

    let logo = store_optional(&state, form.take_file("logo"), LOGO_FOLDER, "logo").await?;
    input.logo_url = logo.as_ref().map(|l| l.url.clone());

    match Venue::create(state.db(), &input).await {
        Ok(venue) => {
            info!(venue_id = venue.id, nombre = %venue.nombre, "venue created");
            Ok((StatusCode::CREATED, Json(venue)))
        }
        Err(e) => {
            if let Some(logo) = logo {
                state.images().delete_by_url(&logo.url).await;
            }
            Err(e.into())
        }
    }
}

async fn update_venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Venue>> {
    let mut form = FormData::from_multipart(multipart).await?;
    let mut input = venue_input(&form)?;

    let existing = Venue::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("venue"))?;

    let logo = store_optional(&state, form.take_file("logo"), LOGO_FOLDER, "logo").await?;
    input.logo_url = logo.as_ref().map(|l| l.url.clone());

    let updated = match Venue::update(state.db(), id, &input).await {
        Ok(Some(venue)) => venue,
        result => {
            if let Some(ref logo) = logo {
                state.images().delete_by_url(&logo.url).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => AppError::NotFound("venue"),
            });
        }
    };

    if logo.is_some() && existing.logo_url != updated.logo_url {
        state
            .images()
            .delete_if_some(existing.logo_url.as_deref())
            .await;
    }

    info!(venue_id = id, "venue updated");
    Ok(Json(updated))
}

async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Venue>> {
    let venue = Venue::delete(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("venue"))?;

    state.images().delete_if_some(venue.logo_url.as_deref()).await;

    info!(venue_id = id, "venue deleted");
    Ok(Json(venue))
}
