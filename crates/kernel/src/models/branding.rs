//! Site branding singleton (row `id = 1`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Branding images of the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Branding {
    pub id: i32,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub icon_url: Option<String>,
}

/// Partial branding update. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBranding {
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub icon_url: Option<String>,
}

impl UpdateBranding {
    pub fn is_empty(&self) -> bool {
        self.logo_url.is_none() && self.banner_url.is_none() && self.icon_url.is_none()
    }
}

impl Branding {
    /// Current branding, if the row exists.
    pub async fn get(pool: &PgPool) -> Result<Option<Self>> {
        let branding = sqlx::query_as::<_, Branding>(
            "SELECT id, logo_url, banner_url, icon_url FROM branding WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        .context("failed to fetch branding")?;

        Ok(branding)
    }

    /// Apply a partial update.
    pub async fn update(pool: &PgPool, input: &UpdateBranding) -> Result<Option<Self>> {
        let branding = sqlx::query_as::<_, Branding>(
            r#"
            UPDATE branding SET
                logo_url = COALESCE($1, logo_url),
                banner_url = COALESCE($2, banner_url),
                icon_url = COALESCE($3, icon_url)
            WHERE id = 1
            RETURNING id, logo_url, banner_url, icon_url
            "#,
        )
        .bind(&input.logo_url)
        .bind(&input.banner_url)
        .bind(&input.icon_url)
        .fetch_optional(pool)
        .await
        .context("failed to update branding")?;

        Ok(branding)
    }
}
