//! Shared route helpers: multipart form parsing, lenient value parsing,
//! image uploads, and the admin guard.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::MethodRouter;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::file::StoredImage;
use crate::listing::filter::parse_date;
use crate::middleware::require_admin;
use crate::state::AppState;

/// Wrap a method router so it requires an admin bearer token.
pub fn admin(state: &AppState, method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.route_layer(from_fn_with_state(state.clone(), require_admin))
}

/// A file part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A parsed multipart form: text fields plus file parts.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain a multipart body.
    ///
    /// Parts with a file name are files; empty file parts (an untouched
    /// file input) are dropped. Repeated names keep the last value.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Build a form from text fields only.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }

    /// Trimmed text value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Required trimmed text value.
    pub fn required(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::validation(format!("'{name}' is required")))
    }

    /// Boolean value: `true`, `1` and `on` are true, anything else false.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.text(name)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "on"))
    }

    /// Integer value where anything unparseable becomes 0.
    pub fn int_or_zero(&self, name: &str) -> i32 {
        self.text(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Integer value where anything unparseable is a validation error.
    pub fn int(&self, name: &str) -> AppResult<Option<i32>> {
        match self.text(name) {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| AppError::validation(format!("'{name}' must be an integer"))),
        }
    }

    /// Category list from a JSON array or a comma-separated string.
    pub fn categories(&self, name: &str) -> Vec<String> {
        let Some(raw) = self.text(name) else {
            return Vec::new();
        };

        let parts: Vec<String> = match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => list,
            Err(_) => raw.split(',').map(str::to_string).collect(),
        };

        parts
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Remove and return a file part.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::validation(e.body_text())
    }
}

/// Store an uploaded image in `folder` with a `prefix`-based name.
pub async fn store_upload(
    state: &AppState,
    file: UploadedFile,
    folder: &str,
    prefix: &str,
) -> AppResult<StoredImage> {
    let stored = state
        .images()
        .store(
            folder,
            prefix,
            &file.file_name,
            &file.content_type,
            file.bytes,
        )
        .await?;
    Ok(stored)
}

/// Store an optional upload.
pub async fn store_optional(
    state: &AppState,
    file: Option<UploadedFile>,
    folder: &str,
    prefix: &str,
) -> AppResult<Option<StoredImage>> {
    match file {
        Some(file) => Ok(Some(store_upload(state, file, folder, prefix).await?)),
        None => Ok(None),
    }
}

/// Parse an event date sent by the admin form: `YYYY-MM-DD` (date input)
/// or `dd/mm/yyyy`.
pub fn parse_event_date(raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    // Date inputs may append a time part.
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| parse_date(day).map_err(|_| ()))
        .map_err(|_| AppError::validation("'event_date' must be YYYY-MM-DD or dd/mm/yyyy"))
}

/// Lenient positive integer from a JSON number or numeric string.
pub fn json_u32(value: Option<&serde_json::Value>) -> Option<u32> {
    let value = value?;
    let n = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(n.max(1)).ok()
}

/// Strict integer from a JSON number or numeric string; `null` or absent is
/// `None`.
pub fn json_i32(body: &serde_json::Value, name: &str) -> AppResult<Option<i32>> {
    let invalid = || AppError::validation(format!("'{name}' must be an integer"));
    match body.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Trimmed string field from a JSON body; blank or non-string is `None`.
pub fn json_text(body: &serde_json::Value, name: &str) -> Option<String> {
    body.get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_fields_trimmed_and_blank_absent() {
        let form = FormData::from_fields([("title", "  Jazz  "), ("venue", "   ")]);
        assert_eq!(form.text("title").as_deref(), Some("Jazz"));
        assert_eq!(form.text("venue"), None);
        assert!(form.required("venue").is_err());
    }

    #[test]
    fn booleans() {
        let form = FormData::from_fields([("a", "true"), ("b", "false"), ("c", "on"), ("d", "x")]);
        assert_eq!(form.bool("a"), Some(true));
        assert_eq!(form.bool("b"), Some(false));
        assert_eq!(form.bool("c"), Some(true));
        assert_eq!(form.bool("d"), Some(false));
        assert_eq!(form.bool("missing"), None);
    }

    #[test]
    fn integers_lenient_and_strict() {
        let form = FormData::from_fields([("order", "abc"), ("n", "7")]);
        assert_eq!(form.int_or_zero("order"), 0);
        assert_eq!(form.int_or_zero("n"), 7);
        assert!(form.int("order").is_err());
        assert!(matches!(form.int("n"), Ok(Some(7))));
        assert!(matches!(form.int("missing"), Ok(None)));
    }

    #[test]
    fn categories_from_json_or_csv() {
        let json_form = FormData::from_fields([("categories", r#"["Jazz", " Live ", ""]"#)]);
        assert_eq!(json_form.categories("categories"), vec!["Jazz", "Live"]);

        let csv_form = FormData::from_fields([("categories", "Rock, Pop,,")]);
        assert_eq!(csv_form.categories("categories"), vec!["Rock", "Pop"]);

        assert!(FormData::default().categories("categories").is_empty());
    }

    #[test]
    fn event_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1);
        assert_eq!(parse_event_date("2025-06-01").ok(), expected);
        assert_eq!(parse_event_date("2025-06-01T00:00:00.000Z").ok(), expected);
        assert_eq!(parse_event_date("01/06/2025").ok(), expected);
        assert!(parse_event_date("June 1").is_err());
    }

    #[test]
    fn json_numbers() {
        assert_eq!(json_u32(Some(&json!(3))), Some(3));
        assert_eq!(json_u32(Some(&json!("4"))), Some(4));
        assert_eq!(json_u32(Some(&json!(-2))), Some(1));
        assert_eq!(json_u32(Some(&json!("x"))), None);
        assert_eq!(json_u32(None), None);

        let body = json!({"a": 5, "b": "6", "c": "x", "d": null, "e": true});
        assert!(matches!(json_i32(&body, "a"), Ok(Some(5))));
        assert!(matches!(json_i32(&body, "b"), Ok(Some(6))));
        assert!(json_i32(&body, "c").is_err());
        assert!(matches!(json_i32(&body, "d"), Ok(None)));
        assert!(json_i32(&body, "e").is_err());
    }
}
