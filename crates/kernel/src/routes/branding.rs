//! Site branding routes.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, put},
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::file::StoredImage;
use crate::models::{Branding, UpdateBranding};
use crate::routes::helpers::{FormData, admin, store_optional};
use crate::state::AppState;

/// Create the branding router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/branding",
        get(get_branding).merge(admin(state, put(update_branding))),
    )
}

async fn get_branding(State(state): State<AppState>) -> AppResult<Json<Branding>> {
    let branding = Branding::get(state.db()).await?.unwrap_or_else(|| Branding {
        id: 1,
        ..Branding::default()
    });
    Ok(Json(branding))
}

/// Uploaded file wins over the matching `*_url` text field.
fn pick(upload: Option<&StoredImage>, form: &FormData, url_field: &str) -> Option<String> {
    upload
        .map(|u| u.url.clone())
        .or_else(|| form.text(url_field))
}

/// URLs held by `previous` that `updated` no longer points at.
fn replaced_urls(previous: &Branding, updated: &Branding) -> Vec<String> {
    [
        (&previous.logo_url, &updated.logo_url),
        (&previous.banner_url, &updated.banner_url),
        (&previous.icon_url, &updated.icon_url),
    ]
    .into_iter()
    .filter_map(|(old, new)| match old {
        Some(old) if new.as_ref() != Some(old) => Some(old.clone()),
        _ => None,
    })
    .collect()
}

async fn update_branding(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<Branding>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let logo_file = form.take_file("logo");
    let banner_file = form.take_file("banner");
    let icon_file = form.take_file("icon");

    let mut uploaded: Vec<StoredImage> = Vec::new();
    let stored = async {
        let logo = store_optional(&state, logo_file, "", "logo").await?;
        uploaded.extend(logo.clone());
        let banner = store_optional(&state, banner_file, "", "banner").await?;
        uploaded.extend(banner.clone());
        let icon = store_optional(&state, icon_file, "", "icon").await?;
        uploaded.extend(icon.clone());
        AppResult::Ok((logo, banner, icon))
    }
    .await;

    let (logo, banner, icon) = match stored {
        Ok(stored) => stored,
        Err(e) => {
            for image in &uploaded {
                state.images().delete_by_url(&image.url).await;
            }
            return Err(e);
        }
    };

    let input = UpdateBranding {
        logo_url: pick(logo.as_ref(), &form, "logo_url"),
        banner_url: pick(banner.as_ref(), &form, "banner_url"),
        icon_url: pick(icon.as_ref(), &form, "icon_url"),
    };
    if input.is_empty() {
        return Err(AppError::validation("no branding fields to update"));
    }

    let previous = match Branding::get(state.db()).await {
        Ok(previous) => previous,
        Err(e) => {
            warn!(error = %e, "failed to load branding before update, replaced files are kept");
            None
        }
    };
    let updated = match Branding::update(state.db(), &input).await {
        Ok(Some(branding)) => branding,
        result => {
            for image in &uploaded {
                state.images().delete_by_url(&image.url).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => AppError::NotFound("branding"),
            });
        }
    };

    if let Some(previous) = previous {
        for old in replaced_urls(&previous, &updated) {
            state.images().delete_by_url(&old).await;
        }
    }

    info!(uploaded = uploaded.len(), "branding updated");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_wins_over_text_url() {
        let form = FormData::from_fields([("logo_url", "https://cdn.example/logo.png")]);
        let stored = StoredImage {
            uri: "local://logo-1-abc.png".to_string(),
            url: "/uploads/logo-1-abc.png".to_string(),
        };

        assert_eq!(
            pick(Some(&stored), &form, "logo_url").as_deref(),
            Some("/uploads/logo-1-abc.png")
        );
        assert_eq!(
            pick(None, &form, "logo_url").as_deref(),
            Some("https://cdn.example/logo.png")
        );
        assert_eq!(pick(None, &form, "icon_url"), None);
    }

    #[test]
    fn only_changed_urls_are_replaced() {
        let previous = Branding {
            id: 1,
            logo_url: Some("/uploads/logo-1-old.png".to_string()),
            banner_url: Some("/uploads/banner-1-keep.png".to_string()),
            icon_url: None,
        };
        let updated = Branding {
            id: 1,
            logo_url: Some("/uploads/logo-2-new.png".to_string()),
            banner_url: Some("/uploads/banner-1-keep.png".to_string()),
            icon_url: Some("/uploads/icon-2-new.png".to_string()),
        };

        assert_eq!(
            replaced_urls(&previous, &updated),
            vec!["/uploads/logo-1-old.png".to_string()]
        );
        assert!(replaced_urls(&updated, &updated).is_empty());
    }
}
