//! Site color palette singleton (row `id = 1`).
//!
//! The API calls the primary color `primary`; the column is
//! `primary_color` because `primary` is reserved in SQL.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Color palette.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Colors {
    pub id: i32,
    pub general: Option<String>,
    #[serde(rename = "primary")]
    pub primary_color: Option<String>,
    pub background: Option<String>,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            id: 1,
            general: None,
            primary_color: None,
            background: None,
        }
    }
}

/// Partial palette update, in API field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateColors {
    pub general: Option<String>,
    pub primary: Option<String>,
    pub background: Option<String>,
}

impl UpdateColors {
    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.primary.is_none() && self.background.is_none()
    }
}

impl Colors {
    /// Current palette, if the row exists.
    pub async fn get(pool: &PgPool) -> Result<Option<Self>> {
        let colors = sqlx::query_as::<_, Colors>(
            "SELECT id, general, primary_color, background FROM colors WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        .context("failed to fetch colors")?;

        Ok(colors)
    }

    /// Apply a partial update.
    pub async fn update(pool: &PgPool, input: &UpdateColors) -> Result<Option<Self>> {
        let colors = sqlx::query_as::<_, Colors>(
            r#"
            UPDATE colors SET
                general = COALESCE($1, general),
                primary_color = COALESCE($2, primary_color),
                background = COALESCE($3, background)
            WHERE id = 1
            RETURNING id, general, primary_color, background
            "#,
        )
        .bind(&input.general)
        .bind(&input.primary)
        .bind(&input.background)
        .fetch_optional(pool)
        .await
        .context("failed to update colors")?;

        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_color_serialized_as_primary() {
        let colors = Colors {
            primary_color: Some("#ff0000".to_string()),
            ..Colors::default()
        };
        let json = serde_json::to_value(&colors).unwrap_or_default();
        assert_eq!(json["primary"], "#ff0000");
        assert!(json.get("primary_color").is_none());
    }

    #[test]
    fn empty_update_detected() {
        assert!(UpdateColors::default().is_empty());
        let update: UpdateColors =
            serde_json::from_str(r##"{"primary":"#000"}"##).unwrap_or_default();
        assert!(!update.is_empty());
    }
}
