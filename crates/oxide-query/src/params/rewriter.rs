//! Named-parameter scanner.

use tracing::{debug, trace};

use super::Placeholder;
use crate::error::{QueryError, Result};
use crate::record::OrderedRecord;

/// Lexical context of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// A statement with positional markers and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement<V> {
    /// SQL text with positional markers.
    pub sql: String,
    /// One entry per named placeholder, in marker order. `None` marks a
    /// name that had no argument.
    pub values: Vec<Option<V>>,
    /// Placeholder names (with leading colon) that had no argument.
    pub unbound: Vec<String>,
    /// Total number of markers emitted, bare `?` markers included.
    pub markers: usize,
}

impl<V> ParsedStatement<V> {
    /// Returns true when every named placeholder was bound.
    #[must_use]
    pub fn is_fully_bound(&self) -> bool {
        self.unbound.is_empty()
    }

    /// Returns the SQL and bound values, or `UnboundParameter` listing the
    /// names that had no argument.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnboundParameter`] when any name was unbound.
    pub fn check(self) -> Result<(String, Vec<V>)> {
        if !self.unbound.is_empty() {
            return Err(QueryError::UnboundParameter {
                names: self.unbound,
            });
        }
        let values = self.values.into_iter().flatten().collect();
        Ok((self.sql, values))
    }
}

/// Rewrites `:name` placeholders into positional markers.
///
/// Text inside single-quoted literals, double-quoted identifiers, `--`
/// comments and `/* */` comments is copied untouched. A `:` directly after
/// another `:` is left alone so `::type` casts survive. A bare `?` becomes a
/// marker as well but binds no value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedParameterRewriter {
    placeholder: Placeholder,
}

impl NamedParameterRewriter {
    /// Creates a rewriter emitting `placeholder` markers.
    #[must_use]
    pub const fn new(placeholder: Placeholder) -> Self {
        Self { placeholder }
    }

    /// Returns the marker style.
    #[must_use]
    pub const fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Rewrites `sql`, looking each `:name` up as `":name"` in `arguments`.
    #[must_use]
    pub fn rewrite<V: Clone>(&self, sql: &str, arguments: &OrderedRecord<V>) -> ParsedStatement<V> {
        let chars: Vec<char> = sql.chars().collect();
        let mut out = String::with_capacity(sql.len());
        let mut values = Vec::new();
        let mut unbound = Vec::new();
        let mut index = 1;
        let mut state = ScanState::Normal;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match state {
                ScanState::SingleQuote => {
                    if c == '\'' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::DoubleQuote => {
                    if c == '"' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::LineComment => {
                    if c == '\n' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::BlockComment => {
                    if c == '*' && next == Some('/') {
                        out.push_str("*/");
                        state = ScanState::Normal;
                        i += 2;
                        continue;
                    }
                }
                ScanState::Normal => match c {
                    '\'' => state = ScanState::SingleQuote,
                    '"' => state = ScanState::DoubleQuote,
                    '/' if next == Some('*') => {
                        out.push_str("/*");
                        state = ScanState::BlockComment;
                        i += 2;
                        continue;
                    }
                    '-' if next == Some('-') => state = ScanState::LineComment,
                    ':' if next.is_some_and(is_identifier_start)
                        && (i == 0 || chars[i - 1] != ':') =>
                    {
                        let end = chars[i + 1..]
                            .iter()
                            .position(|&ch| !is_identifier_part(ch))
                            .map_or(chars.len(), |p| i + 1 + p);
                        let key: String = chars[i..end].iter().collect();

                        match arguments.get(&key) {
                            Some(value) => values.push(Some(value.clone())),
                            None => {
                                values.push(None);
                                unbound.push(key);
                            }
                        }
                        self.placeholder.write_marker(&mut out, index);
                        index += 1;
                        i = end;
                        continue;
                    }
                    '?' => {
                        self.placeholder.write_marker(&mut out, index);
                        index += 1;
                        i += 1;
                        continue;
                    }
                    _ => {}
                },
            }

            out.push(c);
            i += 1;
        }

        let markers = index - 1;
        if unbound.is_empty() {
            trace!(markers, "rewrote named parameters");
        } else {
            debug!(markers, unbound = ?unbound, "named parameters without arguments");
        }

        ParsedStatement {
            sql: out,
            values,
            unbound,
            markers,
        }
    }
}

/// Rewrites `sql` with `$n` markers.
#[must_use]
pub fn rewrite_named_parameters<V: Clone>(
    sql: &str,
    arguments: &OrderedRecord<V>,
) -> ParsedStatement<V> {
    NamedParameterRewriter::default().rewrite(sql, arguments)
}

/// `[A-Za-z$_]`
const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_'
}

/// `[A-Za-z0-9$_]`
const fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '$' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    fn args(pairs: &[(&str, SqlValue)]) -> OrderedRecord {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_simple_rewrite() {
        let a = args(&[(":x", SqlValue::Int(1)), (":y", SqlValue::Int(2))]);
        let parsed = rewrite_named_parameters("a = :x AND b = :y", &a);
        assert_eq!(parsed.sql, "a = $1 AND b = $2");
        assert_eq!(parsed.values, vec![Some(SqlValue::Int(1)), Some(SqlValue::Int(2))]);
        assert_eq!(parsed.markers, 2);
    }

    #[test]
    fn test_repeated_name_binds_twice() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters(":x + :x", &a);
        assert_eq!(parsed.sql, "$1 + $2");
        assert_eq!(parsed.values.len(), 2);
    }

    #[test]
    fn test_leading_placeholder() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters(":x", &a);
        assert_eq!(parsed.sql, "$1");
    }

    #[test]
    fn test_cast_is_untouched() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters("SELECT :x::text, a::int", &a);
        assert_eq!(parsed.sql, "SELECT $1::text, a::int");
        assert_eq!(parsed.values.len(), 1);
    }

    #[test]
    fn test_quotes_and_comments_are_skipped() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let sql = "SELECT ':x', \":x\" -- :x\n/* :x */ FROM t WHERE a = :x";
        let parsed = rewrite_named_parameters(sql, &a);
        assert_eq!(
            parsed.sql,
            "SELECT ':x', \":x\" -- :x\n/* :x */ FROM t WHERE a = $1"
        );
        assert_eq!(parsed.values, vec![Some(SqlValue::Int(5))]);
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters("-- note\n:x", &a);
        assert_eq!(parsed.sql, "-- note\n$1");
    }

    #[test]
    fn test_bare_question_mark_consumes_slot() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters("a = ? AND b = :x", &a);
        assert_eq!(parsed.sql, "a = $1 AND b = $2");
        assert_eq!(parsed.values, vec![Some(SqlValue::Int(5))]);
        assert_eq!(parsed.markers, 2);
    }

    #[test]
    fn test_unbound_is_recorded() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let parsed = rewrite_named_parameters("a = :missing AND b = :x", &a);
        assert_eq!(parsed.sql, "a = $1 AND b = $2");
        assert_eq!(parsed.values, vec![None, Some(SqlValue::Int(5))]);
        assert_eq!(parsed.unbound, vec![String::from(":missing")]);
        assert!(!parsed.is_fully_bound());
        assert_eq!(
            parsed.check(),
            Err(QueryError::UnboundParameter {
                names: vec![String::from(":missing")]
            })
        );
    }

    #[test]
    fn test_check_unwraps_values() {
        let a = args(&[(":x", SqlValue::Int(5))]);
        let (sql, values) = rewrite_named_parameters("a = :x", &a).check().unwrap();
        assert_eq!(sql, "a = $1");
        assert_eq!(values, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_question_styles() {
        let a = args(&[(":x", SqlValue::Int(1)), (":y", SqlValue::Int(2))]);
        let numbered = NamedParameterRewriter::new(Placeholder::QuestionNumbered).rewrite(":x, :y", &a);
        assert_eq!(numbered.sql, "?1, ?2");
        let plain = NamedParameterRewriter::new(Placeholder::Question).rewrite(":x, :y", &a);
        assert_eq!(plain.sql, "?, ?");
    }

    #[test]
    fn test_colon_followed_by_digit_is_literal() {
        let a: OrderedRecord = OrderedRecord::new();
        let parsed = rewrite_named_parameters("SELECT '10:30', 10 :1", &a);
        assert_eq!(parsed.sql, "SELECT '10:30', 10 :1");
        assert_eq!(parsed.markers, 0);
    }

    #[test]
    fn test_identifier_with_dollar_and_underscore() {
        let a = args(&[(":a__b0", SqlValue::Int(1)), (":$x", SqlValue::Int(2))]);
        let parsed = rewrite_named_parameters("t.b = :a__b0 OR c = :$x", &a);
        assert_eq!(parsed.sql, "t.b = $1 OR c = $2");
        assert!(parsed.is_fully_bound());
    }
}
