//! Banner model.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const BANNER_COLUMNS: &str =
    "id, image_url, banner_name, banner_url, banner_order, available, created_at, updated_at";

/// Banner record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Banner {
    pub id: i32,
    pub image_url: String,
    pub banner_name: Option<String>,
    pub banner_url: Option<String>,
    pub banner_order: Option<i32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a banner.
#[derive(Debug, Clone)]
pub struct CreateBanner {
    pub image_url: String,
    pub banner_name: Option<String>,
    pub banner_url: Option<String>,
    pub banner_order: i32,
    pub available: bool,
}

/// Input for updating a banner. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBanner {
    pub image_url: Option<String>,
    pub banner_name: Option<String>,
    pub banner_url: Option<String>,
    pub banner_order: Option<i32>,
    pub available: Option<bool>,
}

impl Banner {
    /// List all banners: ordered ones first, then by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let banners = sqlx::query_as::<_, Banner>(&format!(
            r#"
            SELECT {BANNER_COLUMNS}
            FROM banners
            ORDER BY
                CASE WHEN COALESCE(banner_order, 0) > 0 THEN 0 ELSE 1 END,
                banner_order ASC NULLS LAST,
                banner_name ASC,
                id ASC
            "#
        ))
        .fetch_all(pool)
        .await
        .context("failed to list banners")?;

        Ok(banners)
    }

    /// Banners currently flagged as available.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<Self>> {
        let banners = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banners WHERE available = TRUE ORDER BY banner_order ASC, id ASC"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list available banners")?;

        Ok(banners)
    }

    /// Find a banner by ID.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch banner by id")?;

        Ok(banner)
    }

    /// Create a new banner.
    pub async fn create(pool: &PgPool, input: &CreateBanner) -> Result<Self> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            r#"
            INSERT INTO banners (image_url, banner_name, banner_url, banner_order, available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BANNER_COLUMNS}
            "#
        ))
        .bind(&input.image_url)
        .bind(&input.banner_name)
        .bind(&input.banner_url)
        .bind(input.banner_order)
        .bind(input.available)
        .fetch_one(pool)
        .await
        .context("failed to create banner")?;

        Ok(banner)
    }

    /// Update the given fields and bump `updated_at`.
    pub async fn update(pool: &PgPool, id: i32, input: &UpdateBanner) -> Result<Option<Self>> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            r#"
            UPDATE banners SET
                banner_name = COALESCE($2, banner_name),
                banner_url = COALESCE($3, banner_url),
                image_url = COALESCE($4, image_url),
                banner_order = COALESCE($5, banner_order),
                available = COALESCE($6, available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BANNER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.banner_name)
        .bind(&input.banner_url)
        .bind(&input.image_url)
        .bind(input.banner_order)
        .bind(input.available)
        .fetch_optional(pool)
        .await
        .context("failed to update banner")?;

        Ok(banner)
    }

    /// Delete a banner, returning the removed row.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            "DELETE FROM banners WHERE id = $1 RETURNING {BANNER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to delete banner")?;

        Ok(banner)
    }
}
