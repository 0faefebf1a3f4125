//! Paging helpers.
//!
//! A paged SELECT ends with [`LIMIT_OFFSET`](super::statement::LIMIT_OFFSET);
//! [`Page::bind`] supplies its two arguments. The total row count comes from
//! a companion statement derived from the same builder.

use serde::Serialize;

use super::statement::StatementBuilder;
use crate::error::{QueryError, Result};
use crate::record::OrderedRecord;
use crate::value::SqlValue;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    page_size: u32,
}

impl Page {
    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidPage`] when either number is zero.
    pub fn new(page: u32, page_size: u32) -> Result<Self> {
        if page < 1 {
            return Err(QueryError::InvalidPage(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if page_size < 1 {
            return Err(QueryError::InvalidPage(format!(
                "page size must be at least 1, got {page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Returns the page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the number of rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.page_size)
    }

    /// Inserts `:num_of_records` and `:offset` into `arguments`.
    pub fn bind(&self, arguments: &mut OrderedRecord) {
        arguments.insert(":num_of_records", SqlValue::Int(i64::from(self.page_size)));
        arguments.insert(
            ":offset",
            SqlValue::Int(i64::try_from(self.offset()).unwrap_or(i64::MAX)),
        );
    }
}

/// A page of results with its position in the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEnvelope<T> {
    /// What the rows are (usually the table name).
    pub domain: String,
    /// The page returned.
    pub current_page: u32,
    /// The last page that has rows; at least 1.
    pub last_page: u64,
    /// Rows per page.
    pub page_size: u32,
    /// Rows across all pages.
    pub total_count: u64,
    /// The rows.
    pub data: T,
}

impl<T> PageEnvelope<T> {
    /// Wraps one page of `data`.
    pub fn new(domain: impl Into<String>, data: T, total_count: u64, page: Page) -> Self {
        let last_page = total_count
            .div_ceil(u64::from(page.page_size()))
            .max(1);
        Self {
            domain: domain.into(),
            current_page: page.page(),
            last_page,
            page_size: page.page_size(),
            total_count,
            data,
        }
    }
}

/// Derives `SELECT <projection> FROM <source> [WHERE ...]` from a builder,
/// where the source is the join phrase when one was given, else the table.
fn companion(builder: &StatementBuilder, projection: &str) -> Result<String> {
    if let Some(error) = builder.error() {
        return Err(error.clone());
    }
    let mut statement = StatementBuilder::new().select().raw(projection);
    statement = if builder.join_text().is_empty() {
        statement.from_table(builder.table_name())
    } else {
        statement.from().join_phrase(builder.join_text())
    };
    if !builder.where_text().is_empty() {
        statement = statement.where_clause(builder.where_text());
    }
    statement.build()
}

/// Returns the statement counting every row `builder` would match,
/// ignoring paging. The count column is named `count`.
///
/// # Errors
///
/// Fails with the builder's own error, or when it names neither a table nor
/// a join.
pub fn count_statement(builder: &StatementBuilder) -> Result<String> {
    companion(builder, "COUNT(*) AS count")
}

/// Returns a statement that yields a row when `builder` matches anything.
///
/// # Errors
///
/// See [`count_statement`].
pub fn exists_statement(builder: &StatementBuilder) -> Result<String> {
    companion(builder, "1")
}
