//! Visitor information singleton (row `id = 1`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Free-text visitor information blocks.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Info {
    pub id: i32,
    pub como_llegar: Option<String>,
    pub numeros_utiles: Option<String>,
    pub atractivos: Option<String>,
    pub transporte: Option<String>,
}

/// Partial info update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInfo {
    pub como_llegar: Option<String>,
    pub numeros_utiles: Option<String>,
    pub atractivos: Option<String>,
    pub transporte: Option<String>,
}

impl UpdateInfo {
    pub fn is_empty(&self) -> bool {
        self.como_llegar.is_none()
            && self.numeros_utiles.is_none()
            && self.atractivos.is_none()
            && self.transporte.is_none()
    }
}

impl Info {
    pub async fn get(pool: &PgPool) -> Result<Option<Self>> {
        let info = sqlx::query_as::<_, Info>(
            "SELECT id, como_llegar, numeros_utiles, atractivos, transporte FROM info WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        .context("failed to fetch info")?;

        Ok(info)
    }

    pub async fn update(pool: &PgPool, input: &UpdateInfo) -> Result<Option<Self>> {
        let info = sqlx::query_as::<_, Info>(
            r#"
            UPDATE info SET
                como_llegar = COALESCE($1, como_llegar),
                numeros_utiles = COALESCE($2, numeros_utiles),
                atractivos = COALESCE($3, atractivos),
                transporte = COALESCE($4, transporte)
            WHERE id = 1
            RETURNING id, como_llegar, numeros_utiles, atractivos, transporte
            "#,
        )
        .bind(&input.como_llegar)
        .bind(&input.numeros_utiles)
        .bind(&input.atractivos)
        .bind(&input.transporte)
        .fetch_optional(pool)
        .await
        .context("failed to update info")?;

        Ok(info)
    }
}
