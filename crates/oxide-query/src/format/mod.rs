//! SQL pretty printing for diagnostics.
//!
//! The layout is a single pass over the token stream; it never parses the
//! statement, so any text is accepted.

mod formatter;
mod keywords;

pub use formatter::{format_sql, FormatOptions, SqlFormatter};
pub use keywords::{is_function_name, KeywordClass};
