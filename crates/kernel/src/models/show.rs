//! Show model.
//!
//! A show is a dated event listing. Paged listing lives in
//! [`crate::listing`]; this module holds the plain CRUD queries.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const SHOW_SELECT: &str = "show_id, title, venue, city, event_date, categories, url, address, \
     instagram, web, image_url, is_featured, completed";

/// Show record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Show {
    pub show_id: i32,
    pub title: String,
    pub venue: Option<String>,
    pub city: Option<String>,

    /// Calendar date of the event (serialized as `YYYY-MM-DD`).
    pub event_date: NaiveDate,

    /// Free-form category labels, in the order they were entered.
    pub categories: Vec<String>,

    pub url: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub web: Option<String>,

    /// Public URL of the stored flyer.
    pub image_url: Option<String>,

    pub is_featured: bool,
    pub completed: bool,
}

/// Input for creating or updating a show.
#[derive(Debug, Clone)]
pub struct ShowInput {
    pub title: String,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub event_date: NaiveDate,
    pub categories: Vec<String>,
    pub url: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub web: Option<String>,
    pub is_featured: bool,
    pub completed: bool,

    /// New flyer URL. On update, `None` keeps the current one.
    pub image_url: Option<String>,
}

/// Slide entry for the home carousel.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShowUrl {
    pub url: Option<String>,
}

/// Compact row for the "upcoming" strip.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShowSummary {
    pub title: String,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub url: Option<String>,
}

impl Show {
    /// List every show, oldest event first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let shows = sqlx::query_as::<_, Show>(&format!(
            "SELECT {SHOW_SELECT} FROM shows ORDER BY event_date ASC, show_id ASC"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list shows")?;

        Ok(shows)
    }

    /// Find a show by ID.
    pub async fn find_by_id(pool: &PgPool, show_id: i32) -> Result<Option<Self>> {
        let show = sqlx::query_as::<_, Show>(&format!(
            "SELECT {SHOW_SELECT} FROM shows WHERE show_id = $1"
        ))
        .bind(show_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch show by id")?;

        Ok(show)
    }

    /// Create a new show.
    pub async fn create(pool: &PgPool, input: &ShowInput) -> Result<Self> {
        let show = sqlx::query_as::<_, Show>(&format!(
            r#"
            INSERT INTO shows (
                title, venue, city, event_date, categories, url, address,
                instagram, web, image_url, is_featured, completed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SHOW_SELECT}
            "#
        ))
        .bind(&input.title)
        .bind(&input.venue)
        .bind(&input.city)
        .bind(input.event_date)
        .bind(&input.categories)
        .bind(&input.url)
        .bind(&input.address)
        .bind(&input.instagram)
        .bind(&input.web)
        .bind(&input.image_url)
        .bind(input.is_featured)
        .bind(input.completed)
        .fetch_one(pool)
        .await
        .context("failed to create show")?;

        Ok(show)
    }

    /// Replace a show's fields. The flyer only changes when
    /// `input.image_url` is set.
    pub async fn update(pool: &PgPool, show_id: i32, input: &ShowInput) -> Result<Option<Self>> {
        let show = sqlx::query_as::<_, Show>(&format!(
            r#"
            UPDATE shows SET
                title = $2,
                venue = $3,
                city = $4,
                event_date = $5,
                categories = $6,
                url = $7,
                address = $8,
                instagram = $9,
                web = $10,
                image_url = COALESCE($11, image_url),
                is_featured = $12,
                completed = $13
            WHERE show_id = $1
            RETURNING {SHOW_SELECT}
            "#
        ))
        .bind(show_id)
        .bind(&input.title)
        .bind(&input.venue)
        .bind(&input.city)
        .bind(input.event_date)
        .bind(&input.categories)
        .bind(&input.url)
        .bind(&input.address)
        .bind(&input.instagram)
        .bind(&input.web)
        .bind(&input.image_url)
        .bind(input.is_featured)
        .bind(input.completed)
        .fetch_optional(pool)
        .await
        .context("failed to update show")?;

        Ok(show)
    }

    /// Delete a show, returning the removed row.
    pub async fn delete(pool: &PgPool, show_id: i32) -> Result<Option<Self>> {
        let show = sqlx::query_as::<_, Show>(&format!(
            "DELETE FROM shows WHERE show_id = $1 RETURNING {SHOW_SELECT}"
        ))
        .bind(show_id)
        .fetch_optional(pool)
        .await
        .context("failed to delete show")?;

        Ok(show)
    }

    /// Delete every show dated before today, returning the removed rows so
    /// their flyers can be cleaned up.
    pub async fn purge_past(pool: &PgPool) -> Result<Vec<Self>> {
        let shows = sqlx::query_as::<_, Show>(&format!(
            "DELETE FROM shows WHERE event_date < CURRENT_DATE RETURNING {SHOW_SELECT}"
        ))
        .fetch_all(pool)
        .await
        .context("failed to purge past shows")?;

        Ok(shows)
    }

    /// Links for the home carousel.
    pub async fn list_main(pool: &PgPool) -> Result<Vec<ShowUrl>> {
        let urls = sqlx::query_as::<_, ShowUrl>(
            "SELECT url FROM shows ORDER BY event_date ASC, show_id ASC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list show urls")?;

        Ok(urls)
    }

    /// Title, venue, city and link of current and future shows.
    pub async fn list_upcoming_summary(pool: &PgPool) -> Result<Vec<ShowSummary>> {
        let rows = sqlx::query_as::<_, ShowSummary>(
            r#"
            SELECT title, venue, city, url
            FROM shows
            WHERE event_date >= CURRENT_DATE
            ORDER BY event_date ASC, show_id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list upcoming shows")?;

        Ok(rows)
    }
}
