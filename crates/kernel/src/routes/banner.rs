//! Banner routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{Banner, CreateBanner, UpdateBanner};
use crate::routes::helpers::{FormData, admin, store_optional, store_upload};
use crate::state::AppState;

const BANNER_FOLDER: &str = "banners";

/// Create the banner router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/banners",
            get(list_banners).merge(admin(state, post(create_banner))),
        )
        .route("/banners/available", get(list_available))
        .route(
            "/banners/{id}",
            get(get_banner).merge(admin(
                state,
                put(update_banner).delete(delete_banner),
            )),
        )
}

async fn list_banners(State(state): State<AppState>) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(Banner::list_all(state.db()).await?))
}

async fn list_available(State(state): State<AppState>) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(Banner::list_available(state.db()).await?))
}

async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Banner>> {
    Banner::find_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("banner"))
}

/// Text fields of a banner form. The image URL is filled in after upload.
fn update_fields(form: &FormData) -> AppResult<UpdateBanner> {
    Ok(UpdateBanner {
        image_url: None,
        banner_name: form.text("banner_name"),
        banner_url: form.text("banner_url"),
        banner_order: form.int("banner_order")?,
        available: form.bool("available"),
    })
}

async fn create_banner(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Banner>)> {
    let mut form = FormData::from_multipart(multipart).await?;
    let fields = update_fields(&form)?;
    let file = form
        .take_file("image")
        .ok_or_else(|| AppError::validation("'image' is required"))?;

    let image = store_upload(&state, file, BANNER_FOLDER, "banner").await?;

    let input = CreateBanner {
        image_url: image.url.clone(),
        banner_name: fields.banner_name,
        banner_url: fields.banner_url,
        banner_order: fields.banner_order.unwrap_or(0),
        available: fields.available.unwrap_or(true),
    };

    match Banner::create(state.db(), &input).await {
        Ok(banner) => {
            info!(banner_id = banner.id, "banner created");
            Ok((StatusCode::CREATED, Json(banner)))
        }
        Err(e) => {
            state.images().delete_by_url(&image.url).await;
            Err(e.into())
        }
    }
}

async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Banner>> {
    let mut form = FormData::from_multipart(multipart).await?;
    let mut input = update_fields(&form)?;

    let existing = Banner::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("banner"))?;

    let image = store_optional(&state, form.take_file("image"), BANNER_FOLDER, "banner").await?;
    input.image_url = image.as_ref().map(|i| i.url.clone());

    let updated = match Banner::update(state.db(), id, &input).await {
        Ok(Some(banner)) => banner,
        result => {
            if let Some(ref image) = image {
                state.images().delete_by_url(&image.url).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => AppError::NotFound("banner"),
            });
        }
    };

    if image.is_some() && existing.image_url != updated.image_url {
        state.images().delete_by_url(&existing.image_url).await;
    }

    info!(banner_id = id, "banner updated");
    Ok(Json(updated))
}

async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Banner>> {
    let banner = Banner::delete(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("banner"))?;

    state.images().delete_if_some(Some(&banner.image_url)).await;

    info!(banner_id = id, "banner deleted");
    Ok(Json(banner))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn order_must_be_numeric() {
        let form = FormData::from_fields([("banner_order", "primero")]);
        assert!(update_fields(&form).is_err());
    }

    #[test]
    fn absent_fields_stay_unset() {
        let form = FormData::from_fields([("banner_name", "Verano"), ("available", "false")]);
        let input = update_fields(&form).unwrap();
        assert_eq!(input.banner_name.as_deref(), Some("Verano"));
        assert_eq!(input.available, Some(false));
        assert_eq!(input.banner_order, None);
        assert_eq!(input.banner_url, None);
    }
}
