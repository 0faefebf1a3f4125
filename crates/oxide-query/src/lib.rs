//! # oxide-query
//!
//! Text-level query compilation: turns compact filter expressions and fluent
//! builder calls into parameterized SQL with an ordered list of bind values.
//!
//! This crate provides:
//! - A filter DSL compiler (`{age:gt:18|AND|name:contains:jo}`)
//! - A named-parameter rewriter (`:name` to `$1`, `?1` or `?`) that leaves
//!   quoted text and comments alone
//! - A fluent statement builder with paging helpers
//! - A SQL pretty printer for logging
//! - An insertion-ordered record used for arguments and rows
//!
//! Nothing here talks to a database; the output is handed to a driver.
//!
//! ## From filter to driver
//!
//! ```rust
//! use oxide_query::{compile_filter, rewrite_named_parameters, SqlValue};
//!
//! let compiled = compile_filter("{age:gt:18}").unwrap();
//! assert_eq!(compiled.predicate, "(age > :age0 )");
//!
//! let sql = format!("SELECT * FROM users WHERE {}", compiled.predicate);
//! let parsed = rewrite_named_parameters(&sql, &compiled.arguments);
//!
//! assert_eq!(parsed.sql, "SELECT * FROM users WHERE (age > $1 )");
//! assert_eq!(parsed.values, vec![Some(SqlValue::Text(String::from("18")))]);
//! ```
//!
//! ## Quotes and comments are left alone
//!
//! ```rust
//! use oxide_query::{rewrite_named_parameters, OrderedRecord, SqlValue};
//!
//! let mut arguments = OrderedRecord::new();
//! arguments.insert(":id", SqlValue::Int(1));
//!
//! let parsed = rewrite_named_parameters("SELECT ':id' -- :id\nWHERE id = :id", &arguments);
//! assert_eq!(parsed.sql, "SELECT ':id' -- :id\nWHERE id = $1");
//! ```

pub mod builder;
pub mod error;
pub mod filter;
pub mod format;
pub mod lexer;
pub mod params;
pub mod record;
pub mod value;

pub use builder::{
    count_statement, exists_statement, Aggregate, Column, Order, Page, PageEnvelope, SortKey,
    StatementBuilder,
};
pub use error::{QueryError, Result};
pub use filter::{compile_filter, CompiledFilter, FilterClause, FilterPredicate, Operator};
pub use format::{format_sql, FormatOptions, SqlFormatter};
pub use params::{rewrite_named_parameters, NamedParameterRewriter, ParsedStatement, Placeholder};
pub use record::OrderedRecord;
pub use value::{SqlValue, ToSqlValue};
