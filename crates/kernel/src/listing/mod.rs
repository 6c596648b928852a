//! Show listing: filter parsing, query compilation, and paging.

pub mod filter;
pub mod pager;
pub mod query_builder;

pub use filter::{FilterError, FilterSpec, ListingParams};
pub use pager::{PageResult, ShowPager};
pub use query_builder::{BindParam, CompiledQuery, ShowQueryBuilder};
