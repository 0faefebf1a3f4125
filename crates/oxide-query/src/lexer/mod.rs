//! Generic delimiter tokenizer.
//!
//! Splits text on a caller-supplied delimiter set, optionally returning each
//! delimiter as a token of its own. The SQL formatter drives it with the
//! punctuation and whitespace of SQL; nothing in here knows about SQL.

mod token;
mod tokenizer;

pub use token::{Span, Token};
pub use tokenizer::Tokenizer;
