//! Section ("sección") model.
//!
//! Sections group venues and hang off one of a fixed set of parent groups.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Parent groups a section may belong to.
pub const VALID_PADRES: &[&str] = &["salir", "comer", "dormir", "actividades", "comercios"];

const SECTION_ORDER: &str =
    "CASE WHEN seccion_order > 0 THEN 0 ELSE 1 END, seccion_order ASC, nombre ASC";

/// Section record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Section {
    pub id: i32,
    pub nombre: String,
    pub seccion_padre: String,
    pub seccion_order: i32,
}

/// Input for creating a section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub nombre: Option<String>,
    pub seccion_padre: Option<String>,
    pub seccion_order: Option<i32>,
}

/// Input for updating a section. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSection {
    pub nombre: Option<String>,
    pub seccion_padre: Option<String>,
    pub seccion_order: Option<i32>,
}

/// Normalize a parent group name, returning `None` when it is not one of
/// [`VALID_PADRES`].
pub fn normalize_padre(raw: &str) -> Option<String> {
    let padre = raw.trim().to_lowercase();
    VALID_PADRES.contains(&padre.as_str()).then_some(padre)
}

impl Section {
    /// List all sections in display order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let sections = sqlx::query_as::<_, Section>(&format!(
            "SELECT id, nombre, seccion_padre, seccion_order FROM secciones ORDER BY {SECTION_ORDER}"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list sections")?;

        Ok(sections)
    }

    /// Find a section by ID.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let section = sqlx::query_as::<_, Section>(
            "SELECT id, nombre, seccion_padre, seccion_order FROM secciones WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch section by id")?;

        Ok(section)
    }

    /// Create a section. Callers validate `nombre` and `seccion_padre`.
    pub async fn create(
        pool: &PgPool,
        nombre: &str,
        seccion_padre: &str,
        seccion_order: i32,
    ) -> Result<Self> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            INSERT INTO secciones (nombre, seccion_padre, seccion_order)
            VALUES ($1, $2, $3)
            RETURNING id, nombre, seccion_padre, seccion_order
            "#,
        )
        .bind(nombre)
        .bind(seccion_padre)
        .bind(seccion_order)
        .fetch_one(pool)
        .await
        .context("failed to create section")?;

        Ok(section)
    }

    /// Update the given fields of a section.
    pub async fn update(pool: &PgPool, id: i32, input: &UpdateSection) -> Result<Option<Self>> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            UPDATE secciones SET
                nombre = COALESCE($2, nombre),
                seccion_padre = COALESCE($3, seccion_padre),
                seccion_order = COALESCE($4, seccion_order)
            WHERE id = $1
            RETURNING id, nombre, seccion_padre, seccion_order
            "#,
        )
        .bind(id)
        .bind(&input.nombre)
        .bind(&input.seccion_padre)
        .bind(input.seccion_order)
        .fetch_optional(pool)
        .await
        .context("failed to update section")?;

        Ok(section)
    }

    /// Delete a section. Its venues keep existing with no section.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let section = sqlx::query_as::<_, Section>(
            "DELETE FROM secciones WHERE id = $1 RETURNING id, nombre, seccion_padre, seccion_order",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to delete section")?;

        Ok(section)
    }

    /// Sections under one parent group, in display order.
    pub async fn list_by_parent(pool: &PgPool, seccion_padre: &str) -> Result<Vec<Self>> {
        let sections = sqlx::query_as::<_, Section>(&format!(
            r#"
            SELECT id, nombre, seccion_padre, seccion_order
            FROM secciones
            WHERE seccion_padre = $1
            ORDER BY {SECTION_ORDER}
            "#
        ))
        .bind(seccion_padre)
        .fetch_all(pool)
        .await
        .context("failed to list sections by parent")?;

        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padre_normalized() {
        assert_eq!(normalize_padre(" Comer "), Some("comer".to_string()));
        assert_eq!(normalize_padre("COMERCIOS"), Some("comercios".to_string()));
    }

    #[test]
    fn unknown_padre_rejected() {
        assert_eq!(normalize_padre("bailar"), None);
        assert_eq!(normalize_padre(""), None);
    }
}
