//! Statement assembly.
//!
//! [`StatementBuilder`] accumulates SQL text fluently and remembers enough
//! structure (table, where clause, join) to derive paging companions with
//! [`count_statement`] and [`exists_statement`].
//!
//! # Example
//!
//! ```rust
//! use oxide_query::{count_statement, OrderedRecord, Page, StatementBuilder};
//!
//! let builder = StatementBuilder::new()
//!     .select()
//!     .raw("*")
//!     .from_table("users")
//!     .where_filter("{age:gte:18|AND|name:sw:jo}")
//!     .limit();
//!
//! let mut arguments = OrderedRecord::new();
//! Page::new(2, 20).unwrap().bind(&mut arguments);
//! let (sql, values) = builder.prepare(&arguments).unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM users WHERE (age >= $1 AND name LIKE $2 ) LIMIT $3 OFFSET $4"
//! );
//! assert_eq!(values.len(), 4);
//! assert_eq!(
//!     count_statement(&builder).unwrap(),
//!     "SELECT COUNT(*) AS count FROM users WHERE (age >= :age0 AND name LIKE :name1 )"
//! );
//! ```

mod column;
mod paging;
mod statement;

pub use column::{Aggregate, Column, Order, SortKey};
pub use paging::{count_statement, exists_statement, Page, PageEnvelope};
pub use statement::{StatementBuilder, LIMIT_OFFSET};
