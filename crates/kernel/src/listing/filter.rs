//! Listing filter specification.
//!
//! Normalizes raw query-string parameters into a typed [`FilterSpec`].
//! Missing or unparseable pagination values fall back to defaults; a
//! malformed date or an abusive text filter is rejected before any SQL
//! is built.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Page used when the request omits or garbles `page`.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the request omits or garbles `pageSize`.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Longest accepted search string, in characters.
pub const MAX_SEARCH_LEN: usize = 100;

/// Longest accepted single category, in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Most categories accepted in one request.
pub const MAX_CATEGORIES: usize = 20;

/// Accepted format for the `date` parameter.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Raw listing parameters as they arrive on the query string.
///
/// Every field is kept as text so that bad numbers degrade to defaults
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub categories: Option<String>,
    pub search: Option<String>,
    pub date: Option<String>,
}

/// Rejected listing input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid date format. Use dd/mm/yyyy")]
    InvalidDate,

    #[error("'{field}' must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("'categories' accepts at most {} entries", MAX_CATEGORIES)]
    TooManyCategories,

    #[error("'{0}' contains control characters")]
    ControlCharacters(&'static str),
}

/// Normalized, validated listing constraints.
///
/// An empty `categories`, a `None` search and a `None` date each mean
/// "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub page: u32,
    pub page_size: u32,
    pub categories: Vec<String>,
    pub search: Option<String>,
    pub exact_date: Option<NaiveDate>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            categories: Vec::new(),
            search: None,
            exact_date: None,
        }
    }
}

impl FilterSpec {
    /// Build a filter from raw parameters, capping `page_size` at `max_page_size`.
    pub fn from_params(params: &ListingParams, max_page_size: u32) -> Result<Self, FilterError> {
        let page = parse_positive(params.page.as_deref(), DEFAULT_PAGE, u32::MAX);
        let page_size = parse_positive(
            params.page_size.as_deref(),
            DEFAULT_PAGE_SIZE,
            max_page_size.max(1),
        );

        let categories = parse_categories(params.categories.as_deref().unwrap_or(""))?;
        let search = normalize_search(params.search.as_deref())?;
        let exact_date = match params.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw)?),
        };

        Ok(Self {
            page,
            page_size,
            categories,
            search,
            exact_date,
        })
    }

    /// Filter for a title-only search, as used by the search endpoint.
    pub fn title_search(title: &str, page: u32, page_size: u32) -> Result<Self, FilterError> {
        Ok(Self {
            page: page.max(1),
            page_size: page_size.max(1),
            search: normalize_search(Some(title))?,
            ..Self::default()
        })
    }

    /// Zero-based row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Parse an integer leniently: anything unparseable becomes `default`,
/// anything parsed is clamped into `1..=max`.
fn parse_positive(raw: Option<&str>, default: u32, max: u32) -> u32 {
    let Some(n) = raw.and_then(|s| s.trim().parse::<i64>().ok()) else {
        return default.min(max);
    };
    n.clamp(1, i64::from(max)) as u32
}

fn parse_categories(raw: &str) -> Result<Vec<String>, FilterError> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let cat = part.trim().to_lowercase();
        if cat.is_empty() || out.contains(&cat) {
            continue;
        }
        check_text("categories", &cat, MAX_CATEGORY_LEN)?;
        out.push(cat);
        if out.len() > MAX_CATEGORIES {
            return Err(FilterError::TooManyCategories);
        }
    }
    Ok(out)
}

fn normalize_search(raw: Option<&str>) -> Result<Option<String>, FilterError> {
    let search = raw.map(str::trim).unwrap_or("").to_lowercase();
    if search.is_empty() {
        return Ok(None);
    }
    check_text("search", &search, MAX_SEARCH_LEN)?;
    Ok(Some(search))
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), FilterError> {
    if value.chars().count() > max {
        return Err(FilterError::TooLong { field, max });
    }
    if value.chars().any(char::is_control) {
        return Err(FilterError::ControlCharacters(field));
    }
    Ok(())
}

/// Parse a `dd/mm/yyyy` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FilterError> {
    // chrono accepts a sign and any digit count for %Y; require the plain shape.
    let shaped = raw.len() == 10
        && raw
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 2 || i == 5 { b == b'/' } else { b.is_ascii_digit() });
    if !shaped {
        return Err(FilterError::InvalidDate);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FilterError::InvalidDate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn params() -> ListingParams {
        ListingParams::default()
    }

    #[test]
    fn defaults_when_everything_missing() {
        let spec = FilterSpec::from_params(&params(), 100).unwrap();
        assert_eq!(spec, FilterSpec::default());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 15);
    }

    #[test]
    fn garbage_numbers_fall_back_to_defaults() {
        let p = ListingParams {
            page: Some("abc".to_string()),
            page_size: Some("".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 15);
    }

    #[test]
    fn page_and_size_clamped_to_at_least_one() {
        let p = ListingParams {
            page: Some("-4".to_string()),
            page_size: Some("0".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 1);
    }

    #[test]
    fn page_size_capped() {
        let p = ListingParams {
            page_size: Some("5000".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.page_size, 100);
    }

    #[test]
    fn categories_split_trimmed_lowercased() {
        let p = ListingParams {
            categories: Some(" Jazz, ,ROCK,jazz ".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.categories, vec!["jazz".to_string(), "rock".to_string()]);
    }

    #[test]
    fn empty_categories_mean_no_constraint() {
        let p = ListingParams {
            categories: Some(String::new()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert!(spec.categories.is_empty());
    }

    #[test]
    fn too_many_categories_rejected() {
        let many: Vec<String> = (0..=MAX_CATEGORIES).map(|i| format!("c{i}")).collect();
        let p = ListingParams {
            categories: Some(many.join(",")),
            ..params()
        };
        assert_eq!(
            FilterSpec::from_params(&p, 100),
            Err(FilterError::TooManyCategories)
        );
    }

    #[test]
    fn search_trimmed_and_lowercased() {
        let p = ListingParams {
            search: Some("  Jazz Night ".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.search.as_deref(), Some("jazz night"));
    }

    #[test]
    fn blank_search_is_absent() {
        let p = ListingParams {
            search: Some("   ".to_string()),
            ..params()
        };
        assert_eq!(FilterSpec::from_params(&p, 100).unwrap().search, None);
    }

    #[test]
    fn oversized_search_rejected() {
        let p = ListingParams {
            search: Some("x".repeat(MAX_SEARCH_LEN + 1)),
            ..params()
        };
        assert_eq!(
            FilterSpec::from_params(&p, 100),
            Err(FilterError::TooLong {
                field: "search",
                max: MAX_SEARCH_LEN
            })
        );
    }

    #[test]
    fn control_characters_rejected() {
        let p = ListingParams {
            search: Some("jazz\u{0}".to_string()),
            ..params()
        };
        assert_eq!(
            FilterSpec::from_params(&p, 100),
            Err(FilterError::ControlCharacters("search"))
        );
    }

    #[test]
    fn date_parsed_from_day_month_year() {
        let p = ListingParams {
            date: Some("01/06/2025".to_string()),
            ..params()
        };
        let spec = FilterSpec::from_params(&p, 100).unwrap();
        assert_eq!(spec.exact_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn iso_date_rejected() {
        let p = ListingParams {
            date: Some("2025-06-01".to_string()),
            ..params()
        };
        let err = FilterSpec::from_params(&p, 100).unwrap_err();
        assert_eq!(err, FilterError::InvalidDate);
        assert_eq!(err.to_string(), "Invalid date format. Use dd/mm/yyyy");
    }

    #[test]
    fn impossible_date_rejected() {
        assert_eq!(parse_date("31/02/2025"), Err(FilterError::InvalidDate));
        assert_eq!(parse_date("1/6/2025"), Err(FilterError::InvalidDate));
    }

    #[test]
    fn empty_date_is_absent() {
        let p = ListingParams {
            date: Some(String::new()),
            ..params()
        };
        assert_eq!(FilterSpec::from_params(&p, 100).unwrap().exact_date, None);
    }

    #[test]
    fn offset_from_page() {
        let spec = FilterSpec {
            page: 3,
            page_size: 15,
            ..FilterSpec::default()
        };
        assert_eq!(spec.offset(), 30);
        assert_eq!(FilterSpec::default().offset(), 0);
    }

    #[test]
    fn title_search_spec() {
        let spec = FilterSpec::title_search(" Rock ", 0, 10).unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 10);
        assert_eq!(spec.search.as_deref(), Some("rock"));
        assert!(spec.categories.is_empty());
    }
}
