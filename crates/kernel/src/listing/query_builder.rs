//! Show listing query builder using SeaQuery.
//!
//! Compiles a [`FilterSpec`] into two statements that share one WHERE
//! condition: a paged row fetch and a total count. Every user-supplied
//! value becomes a bound parameter; SeaQuery numbers the placeholders.

use anyhow::{Context, Result, bail};
use sea_query::{
    Alias, Asterisk, Cond, ConditionalStatement, Expr, Order, PostgresQueryBuilder, Query,
    SimpleExpr, Value, Values,
};

use super::filter::FilterSpec;

/// Table holding show records.
pub const SHOWS_TABLE: &str = "shows";

/// Columns selected for a listing row, in `Show` field order.
pub const SHOW_COLUMNS: &[&str] = &[
    "show_id",
    "title",
    "venue",
    "city",
    "event_date",
    "categories",
    "url",
    "address",
    "instagram",
    "web",
    "image_url",
    "is_featured",
    "completed",
];

/// A positional parameter ready to bind to a Postgres statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindParam {
    Text(String),
    Int(i64),
}

/// SQL text plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<BindParam>,
}

/// Query builder for show listings.
pub struct ShowQueryBuilder<'a> {
    filter: &'a FilterSpec,
}

impl<'a> ShowQueryBuilder<'a> {
    pub fn new(filter: &'a FilterSpec) -> Self {
        Self { filter }
    }

    /// The WHERE condition shared by the row and count queries.
    ///
    /// Only current and future shows are listed, so the date floor is
    /// always present.
    pub fn condition(&self) -> Cond {
        let mut cond = Cond::all().add(
            Expr::col((Alias::new(SHOWS_TABLE), Alias::new("event_date")))
                .gte(Expr::cust("CURRENT_DATE")),
        );

        if let Some(date) = self.filter.exact_date {
            cond = cond.add(Expr::cust_with_values(
                "DATE(event_date) = CAST($1 AS DATE)",
                [date.format("%Y-%m-%d").to_string()],
            ));
        }

        if !self.filter.categories.is_empty() {
            let mut any = Cond::any();
            for category in &self.filter.categories {
                any = any.add(category_matches(category));
            }
            cond = cond.add(any);
        }

        if let Some(ref search) = self.filter.search {
            cond = cond.add(Expr::cust_with_values(
                "LOWER(title) LIKE $1",
                [contains_pattern(search)],
            ));
        }

        cond
    }

    /// Build the paged row query.
    ///
    /// Rows are ordered by event date, with `show_id` as the tie-break so
    /// that pages are stable for shows on the same day.
    pub fn build(&self) -> Result<CompiledQuery> {
        let mut query = Query::select();

        query
            .columns(
                SHOW_COLUMNS
                    .iter()
                    .map(|c| (Alias::new(SHOWS_TABLE), Alias::new(*c))),
            )
            .from(Alias::new(SHOWS_TABLE))
            .cond_where(self.condition())
            .order_by(
                (Alias::new(SHOWS_TABLE), Alias::new("event_date")),
                Order::Asc,
            )
            .order_by((Alias::new(SHOWS_TABLE), Alias::new("show_id")), Order::Asc)
            .limit(u64::from(self.filter.page_size))
            .offset(self.filter.offset());

        let (sql, values) = query.build(PostgresQueryBuilder);
        Ok(CompiledQuery {
            sql,
            params: to_bind_params(values).context("failed to compile listing query")?,
        })
    }

    /// Build a COUNT query over the same condition, without paging.
    pub fn build_count(&self) -> Result<CompiledQuery> {
        let mut query = Query::select();

        query
            .expr(Expr::col(Asterisk).count())
            .from(Alias::new(SHOWS_TABLE))
            .cond_where(self.condition());

        let (sql, values) = query.build(PostgresQueryBuilder);
        Ok(CompiledQuery {
            sql,
            params: to_bind_params(values).context("failed to compile count query")?,
        })
    }
}

/// Substring match against the show's categories flattened to text.
///
/// "jazz" also matches a stored "Jazz Fusion"; this mirrors how the guide
/// has always filtered and is intentionally not set membership.
fn category_matches(category: &str) -> SimpleExpr {
    Expr::cust_with_values(
        "LOWER(ARRAY_TO_STRING(categories, ',')) LIKE $1",
        [contains_pattern(category)],
    )
}

fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like_wildcards(value))
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn to_bind_params(values: Values) -> Result<Vec<BindParam>> {
    values
        .0
        .into_iter()
        .map(|value| match value {
            Value::String(Some(s)) => Ok(BindParam::Text(s.to_string())),
            Value::BigUnsigned(Some(n)) => i64::try_from(n)
                .map(BindParam::Int)
                .context("integer parameter out of range"),
            Value::Unsigned(Some(n)) => Ok(BindParam::Int(i64::from(n))),
            Value::BigInt(Some(n)) => Ok(BindParam::Int(n)),
            Value::Int(Some(n)) => Ok(BindParam::Int(i64::from(n))),
            other => bail!("unsupported query parameter: {other:?}"),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn spec() -> FilterSpec {
        FilterSpec::default()
    }

    #[test]
    fn base_query_lists_active_shows_only() {
        let filter = spec();
        let q = ShowQueryBuilder::new(&filter).build().unwrap();

        assert!(q.sql.contains("FROM \"shows\""), "{}", q.sql);
        assert!(q.sql.contains(">= (CURRENT_DATE)"), "{}", q.sql);
        assert!(q.sql.contains("ORDER BY"), "{}", q.sql);
        assert!(q.sql.contains("LIMIT $1 OFFSET $2"), "{}", q.sql);
        assert_eq!(q.params, vec![BindParam::Int(15), BindParam::Int(0)]);
    }

    #[test]
    fn ordering_has_id_tie_break() {
        let filter = spec();
        let q = ShowQueryBuilder::new(&filter).build().unwrap();

        let date_pos = q.sql.find("\"event_date\" ASC").expect("event_date order");
        let id_pos = q.sql.find("\"show_id\" ASC").expect("show_id order");
        assert!(date_pos < id_pos, "{}", q.sql);
    }

    #[test]
    fn count_query_has_no_paging() {
        let filter = spec();
        let q = ShowQueryBuilder::new(&filter).build_count().unwrap();

        assert!(q.sql.contains("COUNT(*)"), "{}", q.sql);
        assert!(q.sql.contains("FROM \"shows\""), "{}", q.sql);
        assert!(!q.sql.contains("LIMIT"), "{}", q.sql);
        assert!(!q.sql.contains("ORDER BY"), "{}", q.sql);
        assert!(q.params.is_empty());
    }

    #[test]
    fn pagination_offset() {
        let filter = FilterSpec {
            page: 2,
            page_size: 15,
            ..spec()
        };
        let q = ShowQueryBuilder::new(&filter).build().unwrap();
        assert_eq!(q.params, vec![BindParam::Int(15), BindParam::Int(15)]);
    }

    #[test]
    fn all_filters_bind_in_placeholder_order() {
        let filter = FilterSpec {
            page: 3,
            page_size: 10,
            categories: vec!["jazz".to_string(), "rock".to_string()],
            search: Some("night".to_string()),
            exact_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        };
        let q = ShowQueryBuilder::new(&filter).build().unwrap();

        assert!(q.sql.contains("DATE(event_date) = CAST($1 AS DATE)"), "{}", q.sql);
        assert!(q.sql.contains("LIKE $2"), "{}", q.sql);
        assert!(q.sql.contains("LIKE $3"), "{}", q.sql);
        assert!(q.sql.contains("LOWER(title) LIKE $4"), "{}", q.sql);
        assert!(q.sql.contains("LIMIT $5 OFFSET $6"), "{}", q.sql);
        assert_eq!(
            q.params,
            vec![
                BindParam::Text("2025-06-01".to_string()),
                BindParam::Text("%jazz%".to_string()),
                BindParam::Text("%rock%".to_string()),
                BindParam::Text("%night%".to_string()),
                BindParam::Int(10),
                BindParam::Int(20),
            ]
        );
    }

    #[test]
    fn count_shares_predicate_params() {
        let filter = FilterSpec {
            categories: vec!["jazz".to_string()],
            search: Some("live".to_string()),
            exact_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..spec()
        };
        let builder = ShowQueryBuilder::new(&filter);
        let rows = builder.build().unwrap();
        let count = builder.build_count().unwrap();

        assert_eq!(count.params.as_slice(), &rows.params[..rows.params.len() - 2]);

        let where_of = |sql: &str| {
            let start = sql.find("WHERE").expect("where clause");
            let end = sql.find(" ORDER BY").unwrap_or(sql.len());
            sql[start..end].to_string()
        };
        assert_eq!(where_of(&rows.sql), where_of(&count.sql));
    }

    #[test]
    fn categories_are_or_grouped() {
        let filter = FilterSpec {
            categories: vec!["jazz".to_string(), "rock".to_string()],
            ..spec()
        };
        let q = ShowQueryBuilder::new(&filter).build_count().unwrap();

        assert!(q.sql.contains(" OR "), "{}", q.sql);
        assert!(q.sql.contains("ARRAY_TO_STRING(categories, ',')"), "{}", q.sql);
    }

    #[test]
    fn values_never_inlined() {
        let filter = FilterSpec {
            search: Some("'; drop table shows; --".to_string()),
            categories: vec!["x' or '1'='1".to_string()],
            ..spec()
        };
        let q = ShowQueryBuilder::new(&filter).build().unwrap();

        assert!(!q.sql.contains("drop table"), "{}", q.sql);
        assert!(!q.sql.contains("'1'='1"), "{}", q.sql);
        assert!(
            q.params
                .contains(&BindParam::Text("%'; drop table shows; --%".to_string()))
        );
    }

    #[test]
    fn like_wildcards_escaped() {
        let filter = FilterSpec {
            search: Some("100%_done".to_string()),
            ..spec()
        };
        let q = ShowQueryBuilder::new(&filter).build_count().unwrap();
        assert_eq!(q.params, vec![BindParam::Text("%100\\%\\_done%".to_string())]);
    }

    #[test]
    fn escape_like_wildcards_function() {
        assert_eq!(super::escape_like_wildcards("hello"), "hello");
        assert_eq!(super::escape_like_wildcards("100%"), "100\\%");
        assert_eq!(super::escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(super::escape_like_wildcards("a\\b"), "a\\\\b");
    }
}
