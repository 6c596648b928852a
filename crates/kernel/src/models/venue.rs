//! Venue ("lugar") model.
//!
//! Venues belong to at most one section. Read queries join the section to
//! expose its name alongside the venue.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Pinned venues (order > 0) first by order, then the rest by name.
const VENUE_ORDER: &str = "CASE WHEN l.lugares_order > 0 THEN 0 ELSE 1 END, \
     l.lugares_order ASC, LOWER(TRIM(l.nombre)) ASC";

const VENUE_COLUMNS: &str = "l.id, l.nombre, l.direccion, l.link_direccion, l.telefono, \
     l.logo_url, l.descripcion, l.reservas, l.menu, l.delivery, l.web, l.is_featured, \
     l.instagram, l.youtube, l.seccion_id, l.lugares_order";

/// Venue record, joined with its section.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Venue {
    pub id: i32,
    pub nombre: String,
    pub direccion: Option<String>,
    pub link_direccion: Option<String>,
    pub telefono: Option<String>,
    pub logo_url: Option<String>,
    pub descripcion: Option<String>,
    pub reservas: Option<String>,
    pub menu: Option<String>,
    pub delivery: Option<String>,
    pub web: Option<String>,
    pub is_featured: bool,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub seccion_id: Option<i32>,
    pub lugares_order: i32,

    /// Name of the owning section, if any.
    pub seccion_nombre: Option<String>,

    /// Parent group of the owning section. Only filled by the by-parent
    /// lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub seccion_padre: Option<String>,
}

/// Input for creating or replacing a venue.
#[derive(Debug, Clone, Default)]
pub struct VenueInput {
    pub nombre: String,
    pub direccion: Option<String>,
    pub link_direccion: Option<String>,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    pub reservas: Option<String>,
    pub menu: Option<String>,
    pub delivery: Option<String>,
    pub web: Option<String>,
    pub is_featured: bool,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub seccion_id: Option<i32>,
    pub lugares_order: i32,

    /// New logo URL. On update, `None` keeps the current logo.
    pub logo_url: Option<String>,
}

impl Venue {
    /// List all venues in display order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}, s.nombre AS seccion_nombre
            FROM lugares l
            LEFT JOIN secciones s ON l.seccion_id = s.id
            ORDER BY {VENUE_ORDER}
            "#
        ))
        .fetch_all(pool)
        .await
        .context("failed to list venues")?;

        Ok(venues)
    }

    /// Find a venue by ID.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}, s.nombre AS seccion_nombre
            FROM lugares l
            LEFT JOIN secciones s ON l.seccion_id = s.id
            WHERE l.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch venue by id")?;

        Ok(venue)
    }

    /// Create a new venue.
    pub async fn create(pool: &PgPool, input: &VenueInput) -> Result<Self> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO lugares (
                nombre, direccion, link_direccion, telefono, logo_url, descripcion,
                reservas, menu, delivery, web, is_featured, instagram, youtube,
                seccion_id, lugares_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&input.nombre)
        .bind(&input.direccion)
        .bind(&input.link_direccion)
        .bind(&input.telefono)
        .bind(&input.logo_url)
        .bind(&input.descripcion)
        .bind(&input.reservas)
        .bind(&input.menu)
        .bind(&input.delivery)
        .bind(&input.web)
        .bind(input.is_featured)
        .bind(&input.instagram)
        .bind(&input.youtube)
        .bind(input.seccion_id)
        .bind(input.lugares_order)
        .fetch_one(pool)
        .await
        .context("failed to create venue")?;

        Self::find_by_id(pool, id)
            .await?
            .context("created venue vanished")
    }

    /// Replace all fields of a venue. The logo only changes when
    /// `input.logo_url` is set.
    pub async fn update(pool: &PgPool, id: i32, input: &VenueInput) -> Result<Option<Self>> {
        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE lugares SET
                nombre = $2,
                direccion = $3,
                link_direccion = $4,
                telefono = $5,
                logo_url = COALESCE($6, logo_url),
                descripcion = $7,
                reservas = $8,
                menu = $9,
                delivery = $10,
                web = $11,
                is_featured = $12,
                instagram = $13,
                youtube = $14,
                seccion_id = $15,
                lugares_order = $16
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.nombre)
        .bind(&input.direccion)
        .bind(&input.link_direccion)
        .bind(&input.telefono)
        .bind(&input.logo_url)
        .bind(&input.descripcion)
        .bind(&input.reservas)
        .bind(&input.menu)
        .bind(&input.delivery)
        .bind(&input.web)
        .bind(input.is_featured)
        .bind(&input.instagram)
        .bind(&input.youtube)
        .bind(input.seccion_id)
        .bind(input.lugares_order)
        .fetch_optional(pool)
        .await
        .context("failed to update venue")?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Delete a venue, returning its last state.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let Some(venue) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM lugares WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete venue")?;

        Ok(Some(venue))
    }

    /// Venues whose section belongs to `seccion_padre` (case-insensitive).
    pub async fn list_by_parent(pool: &PgPool, seccion_padre: &str) -> Result<Vec<Self>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}, s.nombre AS seccion_nombre, s.seccion_padre
            FROM lugares l
            JOIN secciones s ON l.seccion_id = s.id
            WHERE LOWER(s.seccion_padre) = LOWER($1)
            ORDER BY {VENUE_ORDER}
            "#
        ))
        .bind(seccion_padre)
        .fetch_all(pool)
        .await
        .context("failed to list venues by parent")?;

        Ok(venues)
    }

    /// Venues in the named section under `seccion_padre` (both
    /// case-insensitive).
    pub async fn list_by_parent_and_section(
        pool: &PgPool,
        seccion_padre: &str,
        seccion_nombre: &str,
    ) -> Result<Vec<Self>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}, s.nombre AS seccion_nombre, s.seccion_padre
            FROM lugares l
            JOIN secciones s ON l.seccion_id = s.id
            WHERE LOWER(s.seccion_padre) = LOWER($1)
              AND LOWER(s.nombre) = LOWER($2)
            ORDER BY {VENUE_ORDER}
            "#
        ))
        .bind(seccion_padre)
        .bind(seccion_nombre)
        .fetch_all(pool)
        .await
        .context("failed to list venues by parent and section")?;

        Ok(venues)
    }
}
