//! Named-parameter rewriting.
//!
//! Converts `:name` placeholders into the positional markers a driver
//! understands, collecting the bound values in marker order.
//!
//! ```rust
//! use oxide_query::params::rewrite_named_parameters;
//! use oxide_query::{OrderedRecord, SqlValue};
//!
//! let mut args = OrderedRecord::new();
//! args.insert(":x", SqlValue::Int(1));
//! args.insert(":y", SqlValue::Text(String::from("it's")));
//!
//! let parsed = rewrite_named_parameters("SELECT * FROM t WHERE a = :x AND b = :y", &args);
//! assert_eq!(parsed.sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
//! assert_eq!(
//!     parsed.values,
//!     vec![Some(SqlValue::Int(1)), Some(SqlValue::Text(String::from("it's")))]
//! );
//! ```

mod placeholder;
mod rewriter;

pub use placeholder::Placeholder;
pub use rewriter::{rewrite_named_parameters, NamedParameterRewriter, ParsedStatement};
