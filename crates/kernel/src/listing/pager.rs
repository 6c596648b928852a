//! Listing execution.
//!
//! Runs the compiled count and row queries inside one transaction so a
//! single statement timeout covers both.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};

use super::filter::FilterSpec;
use super::query_builder::{BindParam, ShowQueryBuilder};
use crate::models::Show;

/// One page of listing results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    /// Create a page with derived page count.
    pub fn new(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = if page_size > 0 {
            total.div_ceil(u64::from(page_size))
        } else {
            0
        };

        Self {
            data,
            total,
            total_pages,
            page,
            page_size,
        }
    }
}

/// Executes show listings against the pool.
#[derive(Clone)]
pub struct ShowPager {
    pool: PgPool,
    query_timeout: Duration,
}

impl ShowPager {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Fetch one page of current shows matching `filter`.
    ///
    /// An empty result is a valid page. Errors come only from storage,
    /// including a cancelled statement when the timeout elapses.
    pub async fn paginate(&self, filter: &FilterSpec) -> Result<PageResult<Show>> {
        let builder = ShowQueryBuilder::new(filter);
        let count = builder.build_count()?;
        let rows = builder.build()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        // SET does not accept bind parameters; the value is a plain integer.
        let timeout_ms = self.query_timeout.as_millis().max(1);
        sqlx::query(&format!("SET LOCAL statement_timeout = {timeout_ms}"))
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let total: i64 = bind_scalar(sqlx::query_scalar(&count.sql), &count.params)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute count query")?;

        let data: Vec<Show> = bind_rows(sqlx::query_as(&rows.sql), &rows.params)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute listing query")?;

        tx.commit()
            .await
            .context("failed to commit listing transaction")?;

        tracing::debug!(
            total,
            returned = data.len(),
            page = filter.page,
            page_size = filter.page_size,
            "show listing executed"
        );

        Ok(PageResult::new(
            data,
            u64::try_from(total).unwrap_or(0),
            filter.page,
            filter.page_size,
        ))
    }
}

fn bind_rows<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[BindParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            BindParam::Text(s) => query.bind(s.clone()),
            BindParam::Int(n) => query.bind(*n),
        };
    }
    query
}

fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[BindParam],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            BindParam::Text(s) => query.bind(s.clone()),
            BindParam::Int(n) => query.bind(*n),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_last_page() {
        let page: PageResult<()> = PageResult::new(vec![(), ()], 17, 2, 15);
        assert_eq!(page.total, 17);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn empty_listing_has_zero_pages() {
        let page: PageResult<()> = PageResult::new(vec![], 0, 1, 15);
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn exact_multiple() {
        let page: PageResult<()> = PageResult::new(vec![], 30, 3, 15);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn serializes_camel_case() {
        let page: PageResult<u8> = PageResult::new(vec![1], 1, 1, 15);
        let json = serde_json::to_value(&page).unwrap_or_default();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["pageSize"], 15);
        assert_eq!(json["data"][0], 1);
        assert!(json.get("total_pages").is_none());
    }
}
