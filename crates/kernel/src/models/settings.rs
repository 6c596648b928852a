//! Site settings singleton (row `id = 1`).

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static INSTAGRAM_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)instagram\.com/([^/?\s]+)").expect("valid regex literal")
});

/// Site contact and description settings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Settings {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub instagram: Option<String>,
    pub telephone: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: 1,
            title: Some(String::new()),
            description: Some(String::new()),
            email: Some(String::new()),
            instagram: Some(String::new()),
            telephone: Some(String::new()),
        }
    }
}

/// Partial settings update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub instagram: Option<String>,
    pub telephone: Option<String>,
}

impl UpdateSettings {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.email.is_none()
            && self.instagram.is_none()
            && self.telephone.is_none()
    }

    /// Validate the email and reduce the instagram value to a bare handle.
    ///
    /// An empty email clears the field and is accepted.
    pub fn normalized(mut self) -> Result<Self, &'static str> {
        if let Some(ref email) = self.email
            && !email.is_empty()
            && !is_valid_email(email)
        {
            return Err("invalid email");
        }
        self.instagram = self.instagram.as_deref().map(normalize_instagram);
        Ok(self)
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Reduce `https://instagram.com/handle`, `@handle` or `handle` to `handle`.
pub fn normalize_instagram(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("http") {
        return match INSTAGRAM_URL.captures(trimmed).and_then(|c| c.get(1)) {
            Some(handle) => handle.as_str().trim_start_matches('@').to_string(),
            None => trimmed.to_string(),
        };
    }
    trimmed.trim_start_matches('@').to_string()
}

impl Settings {
    pub async fn get(pool: &PgPool) -> Result<Option<Self>> {
        let settings = sqlx::query_as::<_, Settings>(
            "SELECT id, title, description, email, instagram, telephone FROM settings WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        .context("failed to fetch settings")?;

        Ok(settings)
    }

    pub async fn update(pool: &PgPool, input: &UpdateSettings) -> Result<Option<Self>> {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            UPDATE settings SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                email = COALESCE($3, email),
                instagram = COALESCE($4, instagram),
                telephone = COALESCE($5, telephone)
            WHERE id = 1
            RETURNING id, title, description, email, instagram, telephone
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.email)
        .bind(&input.instagram)
        .bind(&input.telephone)
        .fetch_optional(pool)
        .await
        .context("failed to update settings")?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("info@cartelera.ar"));
        assert!(!is_valid_email("info@cartelera"));
        assert!(!is_valid_email("in fo@cartelera.ar"));
    }

    #[test]
    fn instagram_handles() {
        assert_eq!(normalize_instagram("@guia"), "guia");
        assert_eq!(normalize_instagram(" guia "), "guia");
        assert_eq!(normalize_instagram("https://www.instagram.com/guia/?hl=es"), "guia");
        assert_eq!(normalize_instagram("https://example.com/guia"), "https://example.com/guia");
    }

    #[test]
    fn invalid_email_rejected() {
        let update = UpdateSettings {
            email: Some("nope".to_string()),
            ..UpdateSettings::default()
        };
        assert_eq!(update.normalized().err(), Some("invalid email"));
    }

    #[test]
    fn empty_email_allowed() {
        let update = UpdateSettings {
            email: Some(String::new()),
            instagram: Some("@guia".to_string()),
            ..UpdateSettings::default()
        };
        let normalized = update.normalized().unwrap_or_default();
        assert_eq!(normalized.email.as_deref(), Some(""));
        assert_eq!(normalized.instagram.as_deref(), Some("guia"));
    }
}
