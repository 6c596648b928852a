//! Show routes.
//!
//! Public listing and lookup endpoints plus admin CRUD with flyer uploads.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::listing::filter::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::listing::{FilterSpec, ListingParams, PageResult};
use crate::models::{Show, ShowInput, ShowSummary, ShowUrl};
use crate::routes::helpers::{FormData, admin, json_u32, parse_event_date, store_optional};
use crate::state::AppState;

/// Upload folder for flyers.
const FLYER_FOLDER: &str = "shows";

/// Create the show router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/shows",
            get(list_shows).merge(admin(state, post(create_show))),
        )
        .route("/shows/actualShows", get(actual_shows))
        .route("/shows/search", post(search_by_title))
        .route("/shows/listShowsMain", get(list_main))
        .route("/shows/listShowsProximos", get(list_upcoming))
        .route("/shows/show/{show_id}", get(get_show))
        .route(
            "/shows/updateShow/{show_id}",
            admin(state, put(update_show)),
        )
        .route(
            "/shows/deleteShow/{show_id}",
            admin(state, delete(delete_show)),
        )
        .route("/shows/past", admin(state, delete(purge_past)))
}

/// GET /shows
async fn list_shows(State(state): State<AppState>) -> AppResult<Json<Vec<Show>>> {
    Ok(Json(Show::list_all(state.db()).await?))
}

/// GET /shows/actualShows?page=&pageSize=&categories=&search=&date=dd/mm/yyyy
async fn actual_shows(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<PageResult<Show>>> {
    let filter = FilterSpec::from_params(&params, state.max_page_size())?;
    let page = state.pager().paginate(&filter).await?;
    Ok(Json(page))
}

/// Body of a title search.
#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    page: Option<serde_json::Value>,
    #[serde(default, rename = "pageSize")]
    page_size: Option<serde_json::Value>,
}

/// POST /shows/search
///
/// Paged title search through the same listing compiler, with only the
/// search filter set.
async fn search_by_title(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> AppResult<Json<PageResult<Show>>> {
    let page = json_u32(body.page.as_ref()).unwrap_or(DEFAULT_PAGE);
    let page_size = json_u32(body.page_size.as_ref())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(state.max_page_size());

    let filter = FilterSpec::title_search(&body.title, page, page_size)?;
    Ok(Json(state.pager().paginate(&filter).await?))
}

/// GET /shows/listShowsMain
async fn list_main(State(state): State<AppState>) -> AppResult<Json<Vec<ShowUrl>>> {
    Ok(Json(Show::list_main(state.db()).await?))
}

/// GET /shows/listShowsProximos
async fn list_upcoming(State(state): State<AppState>) -> AppResult<Json<Vec<ShowSummary>>> {
    Ok(Json(Show::list_upcoming_summary(state.db()).await?))
}

/// GET /shows/show/{show_id}
async fn get_show(
    State(state): State<AppState>,
    Path(show_id): Path<i32>,
) -> AppResult<Json<Show>> {
    Show::find_by_id(state.db(), show_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("show"))
}

fn show_input(form: &FormData) -> AppResult<ShowInput> {
    let title = form.required("title")?;
    let event_date = parse_event_date(&form.required("event_date")?)?;

    Ok(ShowInput {
        title,
        venue: form.text("venue"),
        city: form.text("city"),
        event_date,
        categories: form.categories("categories"),
        url: form.text("url"),
        address: form.text("address"),
        instagram: form.text("instagram"),
        web: form.text("web"),
        is_featured: form.bool("is_featured").unwrap_or(false),
        completed: form
            .bool("completed")
            .or_else(|| form.bool("completedevent"))
            .unwrap_or(false),
        image_url: None,
    })
}

/// POST /shows (multipart, flyer in `flyer`)
async fn create_show(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Show>)> {
    let mut form = FormData::from_multipart(multipart).await?;
    let mut input = show_input(&form)?;

    let flyer = store_optional(&state, form.take_file("flyer"), FLYER_FOLDER, "flyer").await?;
    input.image_url = flyer.as_ref().map(|f| f.url.clone());

    match Show::create(state.db(), &input).await {
        Ok(show) => {
            info!(show_id = show.show_id, title = %show.title, "show created");
            Ok((StatusCode::CREATED, Json(show)))
        }
        Err(e) => {
            if let Some(flyer) = flyer {
                state.images().delete_by_url(&flyer.url).await;
            }
            Err(e.into())
        }
    }
}

/// PUT /shows/updateShow/{show_id} (multipart, optional new flyer)
async fn update_show(
    State(state): State<AppState>,
    Path(show_id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Show>> {
    let mut form = FormData::from_multipart(multipart).await?;
    let mut input = show_input(&form)?;

    let existing = Show::find_by_id(state.db(), show_id)
        .await?
        .ok_or(AppError::NotFound("show"))?;

    let flyer = store_optional(&state, form.take_file("flyer"), FLYER_FOLDER, "flyer").await?;
    input.image_url = flyer.as_ref().map(|f| f.url.clone());

    let updated = match Show::update(state.db(), show_id, &input).await {
        Ok(Some(show)) => show,
        result => {
            if let Some(ref flyer) = flyer {
                state.images().delete_by_url(&flyer.url).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => AppError::NotFound("show"),
            });
        }
    };

    if flyer.is_some() && existing.image_url != updated.image_url {
        state
            .images()
            .delete_if_some(existing.image_url.as_deref())
            .await;
    }

    info!(show_id, "show updated");
    Ok(Json(updated))
}

/// DELETE /shows/deleteShow/{show_id}
async fn delete_show(
    State(state): State<AppState>,
    Path(show_id): Path<i32>,
) -> AppResult<Json<Show>> {
    let show = Show::delete(state.db(), show_id)
        .await?
        .ok_or(AppError::NotFound("show"))?;

    state.images().delete_if_some(show.image_url.as_deref()).await;

    info!(show_id, "show deleted");
    Ok(Json(show))
}

/// Result of a past-show purge.
#[derive(Debug, Serialize)]
struct PurgeResponse {
    deleted: usize,
    shows: Vec<Show>,
}

/// DELETE /shows/past
async fn purge_past(State(state): State<AppState>) -> AppResult<Json<PurgeResponse>> {
    let shows = Show::purge_past(state.db()).await?;

    for show in &shows {
        state.images().delete_if_some(show.image_url.as_deref()).await;
    }

    info!(deleted = shows.len(), "past shows purged");
    Ok(Json(PurgeResponse {
        deleted: shows.len(),
        shows,
    }))
}
