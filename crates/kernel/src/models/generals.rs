//! Read-only aggregate of colors, branding and settings for the public
//! site shell.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;

/// Everything the public layout needs in one object.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct Generals {
    pub general: Option<String>,
    pub primary: Option<String>,
    pub background: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub icon: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub instagram: Option<String>,
}

impl Generals {
    /// Load the aggregate. Missing singleton rows yield an all-null object.
    pub async fn get(pool: &PgPool) -> Result<Self> {
        let generals = sqlx::query_as::<_, Generals>(
            r#"
            SELECT
                c.general AS general,
                c.primary_color AS primary,
                c.background AS background,
                b.logo_url AS logo,
                b.banner_url AS banner,
                b.icon_url AS icon,
                s.title AS title,
                s.description AS description,
                s.email AS email,
                s.telephone AS telephone,
                s.instagram AS instagram
            FROM colors c
            CROSS JOIN branding b
            CROSS JOIN settings s
            WHERE c.id = 1 AND b.id = 1 AND s.id = 1
            "#,
        )
        .fetch_optional(pool)
        .await
        .context("failed to fetch generals")?;

        Ok(generals.unwrap_or_default())
    }
}
