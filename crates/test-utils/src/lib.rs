//! Cartelera test utilities.
//!
//! Fixtures for integration tests: a show builder, a direct insert helper,
//! and JSON assertion helpers.

use chrono::{Days, Local, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

/// A tag unique to one test run, for isolating rows in a shared database.
pub fn unique_tag(prefix: &str) -> String {
    let id = Uuid::now_v7().simple().to_string();
    // The random tail of a v7 UUID; the head is a timestamp.
    format!("{prefix}-{}", &id[id.len() - 10..])
}

/// Today's date as the server sees it.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `today` shifted by `days` (negative for the past).
pub fn days_from_today(days: i64) -> NaiveDate {
    let today = today();
    let shift = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        today.checked_add_days(shift)
    } else {
        today.checked_sub_days(shift)
    };
    shifted.unwrap_or(today)
}

/// Create a test show dated today.
pub fn test_show(title: &str) -> TestShow {
    TestShow {
        title: title.to_string(),
        venue: None,
        city: None,
        event_date: today(),
        categories: Vec::new(),
        url: None,
        image_url: None,
        is_featured: false,
        completed: false,
    }
}

/// A test show builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestShow {
    pub title: String,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub event_date: NaiveDate,
    pub categories: Vec<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub completed: bool,
}

impl TestShow {
    /// Set the event date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.event_date = date;
        self
    }

    /// Date the show `days` from today.
    pub fn in_days(self, days: i64) -> Self {
        self.on(days_from_today(days))
    }

    /// Add a category label.
    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.push(category.to_string());
        self
    }

    /// Set venue and city.
    pub fn at(mut self, venue: &str, city: &str) -> Self {
        self.venue = Some(venue.to_string());
        self.city = Some(city.to_string());
        self
    }

    /// Set the ticket URL.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Set the flyer URL.
    pub fn with_image(mut self, image_url: &str) -> Self {
        self.image_url = Some(image_url.to_string());
        self
    }

    /// Mark as featured.
    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    /// Insert the show and return its ID.
    pub async fn insert(&self, pool: &PgPool) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO shows (title, venue, city, event_date, categories, url, image_url,
                               is_featured, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING show_id
            "#,
        )
        .bind(&self.title)
        .bind(&self.venue)
        .bind(&self.city)
        .bind(self.event_date)
        .bind(&self.categories)
        .bind(&self.url)
        .bind(&self.image_url)
        .bind(self.is_featured)
        .bind(self.completed)
        .fetch_one(pool)
        .await
    }
}

/// Delete every show carrying `category`.
pub async fn delete_shows_in_category(pool: &PgPool, category: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shows WHERE $1 = ANY(categories)")
        .bind(category)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that the `error` message of a JSON error body contains `needle`.
    pub fn error_contains(value: &Value, needle: &str) {
        let message = value.get("error").and_then(Value::as_str).unwrap_or_default();
        assert!(
            message.contains(needle),
            "Expected error to contain '{needle}'\nActual: {value}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_builder() {
        let show = test_show("Jazz Night")
            .in_days(3)
            .with_category("Jazz")
            .at("Bar Central", "Rosario")
            .featured();

        assert_eq!(show.title, "Jazz Night");
        assert_eq!(show.event_date, days_from_today(3));
        assert_eq!(show.categories, vec!["Jazz"]);
        assert_eq!(show.city.as_deref(), Some("Rosario"));
        assert!(show.is_featured);
        assert!(!show.completed);
    }

    #[test]
    fn date_shifts() {
        assert!(days_from_today(-1) < today());
        assert!(days_from_today(1) > today());
        assert_eq!(days_from_today(0), today());
    }

    #[test]
    fn tags_are_unique() {
        let a = unique_tag("t");
        let b = unique_tag("t");
        assert!(a.starts_with("t-"));
        assert_ne!(a, b);
    }

    #[test]
    fn assertions() {
        let json = serde_json::json!({"error": "'title' is required"});
        assert::has_key(&json, "error");
        assert::error_contains(&json, "title");
    }
}
