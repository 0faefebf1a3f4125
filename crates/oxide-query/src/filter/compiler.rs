//! Filter DSL compiler.
//!
//! Grammar, informally:
//!
//! ```text
//! filter   = "{" expr "}"
//! expr     = operand ( "|" combiner "|" operand )*
//! operand  = clause | "(" expr ")"
//! combiner = "AND" | "OR"
//! clause   = column ":" operator [ ":" operands ]
//! ```
//!
//! The input is scanned once, left to right, with an explicit
//! operand/combiner expectation instead of recursion.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::operator::{Arity, Operator};
use crate::error::{QueryError, Result};
use crate::record::OrderedRecord;
use crate::value::SqlValue;

const COMBINER_DELIMITER: char = '|';
const CLAUSE_DELIMITER: char = ':';
const OPERAND_DELIMITER: char = ',';

/// The result of compiling a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    /// SQL boolean expression with `:name` placeholders, wrapped in one
    /// outer pair of parentheses.
    pub predicate: String,
    /// Bind arguments keyed by placeholder name.
    pub arguments: OrderedRecord,
    /// Every column referenced, as written.
    pub columns: BTreeSet<String>,
}

/// A single `column:operator:operands` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    /// Column name, possibly alias-qualified (`u.name`).
    pub column: String,
    /// The relation.
    pub operator: Operator,
    /// Raw operands, already split and trimmed. Empty pieces are kept.
    pub operands: Vec<String>,
}

impl FilterClause {
    /// Parses one clause.
    ///
    /// The text is split on `:` into at most three parts, so the operand
    /// itself may contain colons.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedFilter`] for a missing column or
    /// operator, an unknown operator, or the wrong number of operands.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.splitn(3, CLAUSE_DELIMITER).map(str::trim);
        let column = parts.next().unwrap_or_default();
        let Some(token) = parts.next().filter(|t| !t.is_empty()) else {
            return Err(QueryError::malformed(
                "Clause missing the corresponding operation",
                text,
            ));
        };
        if column.is_empty() {
            return Err(QueryError::malformed("Clause missing its column", text));
        }
        let operator = Operator::from_token(token).ok_or_else(|| {
            QueryError::malformed(format!("Unresolvable Operator '{token}'"), text)
        })?;

        let raw = parts.next().unwrap_or_default();
        let operands: Vec<String> = match operator.arity() {
            Arity::None if raw.is_empty() => Vec::new(),
            Arity::None => {
                return Err(QueryError::malformed(
                    format!("{operator} takes no value"),
                    text,
                ))
            }
            Arity::One if raw.is_empty() => {
                return Err(QueryError::malformed(
                    format!("{} expects at least one value", operator.sql()),
                    text,
                ))
            }
            Arity::One => vec![String::from(raw)],
            Arity::Two | Arity::AtLeastOne if raw.is_empty() => Vec::new(),
            // Every comma-split piece binds, empty ones included.
            Arity::Two | Arity::AtLeastOne => raw
                .split(OPERAND_DELIMITER)
                .map(str::trim)
                .map(String::from)
                .collect(),
        };

        if !operator.arity().accepts(operands.len()) {
            let message = match operator.arity() {
                Arity::Two => format!(
                    "{operator} expects two values that are comma separated"
                ),
                _ => format!("{operator} expects at least one value"),
            };
            return Err(QueryError::malformed(message, text));
        }

        Ok(Self {
            column: String::from(column),
            operator,
            operands,
        })
    }

    /// Returns the bind-name stem derived from the column.
    #[must_use]
    pub fn stem(&self) -> String {
        bind_stem(&self.column)
    }

    /// Appends the SQL for this clause to `out` and its arguments to
    /// `arguments`, numbering placeholders from `counter`.
    fn render(&self, counter: usize, out: &mut String, arguments: &mut OrderedRecord) {
        let stem = self.stem();
        out.push_str(&self.column);
        out.push(' ');
        out.push_str(self.operator.sql());
        out.push(' ');

        let names: Vec<String> = (0..self.operands.len())
            .map(|i| format!(":{stem}{}", counter + i))
            .collect();

        match self.operator.arity() {
            Arity::None => {}
            Arity::One => out.push_str(&names[0]),
            Arity::Two => {
                out.push_str(&names[0]);
                out.push_str(" AND ");
                out.push_str(&names[1]);
            }
            Arity::AtLeastOne => {
                out.push('(');
                out.push_str(&names.join(","));
                out.push(')');
            }
        }
        out.push(' ');

        for (name, operand) in names.into_iter().zip(&self.operands) {
            let value = SqlValue::Text(self.operator.wrap_operand(operand));
            if let Some(previous) = arguments.insert(name.clone(), value) {
                trace!(name = %name, previous = %previous, "bind argument overwritten");
            }
        }
    }
}

/// Turns a column into a bind-name stem: the alias dot becomes `__` and any
/// other character outside `[A-Za-z0-9_]` becomes `_`.
#[must_use]
pub fn bind_stem(column: &str) -> String {
    let mut stem = String::with_capacity(column.len() + 1);
    for c in column.chars() {
        match c {
            '.' => stem.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '_' => stem.push(c),
            _ => stem.push('_'),
        }
    }
    stem
}

/// What the scanner accepts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// A clause or `(`.
    Operand,
    /// `AND`, `OR` or `)`.
    Combiner,
}

/// The last structural token seen, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Open,
    Combiner,
    Clause,
    Close,
}

/// Accumulates predicate text and arguments while scanning.
struct Scanner<'a> {
    source: &'a str,
    out: String,
    arguments: OrderedRecord,
    columns: BTreeSet<String>,
    counter: usize,
    depth: usize,
    expect: Expect,
    last: Last,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len() * 2),
            arguments: OrderedRecord::new(),
            columns: BTreeSet::new(),
            counter: 0,
            depth: 0,
            expect: Expect::Operand,
            last: Last::Start,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> QueryError {
        QueryError::malformed(message, self.source)
    }

    /// Handles the `|`-separated text found between two brackets.
    fn segment(&mut self, text: &str) -> Result<()> {
        for piece in text.split(COMBINER_DELIMITER).map(str::trim) {
            if piece.is_empty() {
                continue;
            }
            match (is_combiner(piece), self.expect) {
                (true, Expect::Combiner) => self.combiner(piece),
                (false, Expect::Operand) => self.clause(piece)?,
                (true, Expect::Operand) => {
                    let message = match self.last {
                        Last::Start => {
                            "First combiner operator without a preceding clause disallowed"
                        }
                        Last::Open => {
                            "Combiner operator after '(' without a preceding clause disallowed"
                        }
                        _ => "Consecutive combiner operators disallowed",
                    };
                    return Err(self.malformed(format!("{message} ({piece})")));
                }
                (false, Expect::Combiner) => {
                    return Err(self.malformed(format!(
                        "Clause '{piece}' must be preceded by a combiner operator"
                    )));
                }
            }
        }
        Ok(())
    }

    fn combiner(&mut self, combiner: &str) {
        if !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
        self.out.push_str(combiner);
        self.out.push(' ');
        self.expect = Expect::Operand;
        self.last = Last::Combiner;
    }

    fn clause(&mut self, text: &str) -> Result<()> {
        let clause = FilterClause::parse(text)?;
        clause.render(self.counter, &mut self.out, &mut self.arguments);
        self.columns.insert(clause.column);
        self.counter += 1;
        self.expect = Expect::Combiner;
        self.last = Last::Clause;
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        if self.expect == Expect::Combiner {
            return Err(self.malformed("'(' must be preceded by a combiner operator"));
        }
        if !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
        self.out.push('(');
        self.depth += 1;
        self.last = Last::Open;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(self.malformed("')' without a matching '('"));
        }
        if self.expect == Expect::Operand {
            let message = if self.last == Last::Open {
                "Empty parentheses disallowed"
            } else {
                "Ending combiner operator without a succeeding clause disallowed"
            };
            return Err(self.malformed(message));
        }
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out.push(')');
        self.depth -= 1;
        self.last = Last::Close;
        Ok(())
    }

    fn finish(self) -> Result<CompiledFilter> {
        if self.depth != 0 {
            return Err(self.malformed("The number of '(' must match number of ')'"));
        }
        if self.expect == Expect::Operand {
            let message = if self.last == Last::Start {
                "Empty filter statement provided"
            } else {
                "Ending combiner operator without a succeeding clause disallowed"
            };
            return Err(self.malformed(message));
        }
        Ok(CompiledFilter {
            predicate: format!("({})", self.out),
            arguments: self.arguments,
            columns: self.columns,
        })
    }
}

fn is_combiner(piece: &str) -> bool {
    matches!(piece, "AND" | "OR")
}

/// Checks the braces and parenthesis counts, returning the text between
/// the braces.
fn unwrap_braces(filter: &str) -> Result<&str> {
    if filter.matches('{').count() > 1 || filter.matches('}').count() > 1 {
        return Err(QueryError::malformed(
            "Only one of '{}' are allowed in the filter",
            filter,
        ));
    }
    let Some(rest) = filter.strip_prefix('{') else {
        return Err(QueryError::malformed("Filter must start with '{'", filter));
    };
    let Some(body) = rest.strip_suffix('}') else {
        return Err(QueryError::malformed("Filter must end with '}'", filter));
    };
    if filter.matches('(').count() != filter.matches(')').count() {
        return Err(QueryError::malformed(
            "The number of '(' must match number of ')'",
            filter,
        ));
    }
    Ok(body)
}

/// Compiles a filter into a predicate, its bind arguments and the columns
/// it references.
///
/// ```rust
/// use oxide_query::{compile_filter, SqlValue};
///
/// let compiled = compile_filter("{name:contains:john}").unwrap();
/// assert_eq!(compiled.predicate, "(name LIKE :name0 )");
/// assert_eq!(
///     compiled.arguments.get(":name0"),
///     Some(&SqlValue::Text(String::from("%john%")))
/// );
/// ```
///
/// # Errors
///
/// Returns [`QueryError::MalformedFilter`] when the text does not follow the
/// grammar, names an unknown operator, or gives an operator the wrong number
/// of operands.
pub fn compile_filter(filter: &str) -> Result<CompiledFilter> {
    let filter = filter.trim();
    let body = unwrap_braces(filter)?;
    if body.trim().is_empty() {
        return Err(QueryError::malformed("Empty filter statement provided", filter));
    }

    let mut scanner = Scanner::new(filter);
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => {
                scanner.segment(&body[start..i])?;
                scanner.open()?;
                start = i + 1;
            }
            ')' => {
                scanner.segment(&body[start..i])?;
                scanner.close()?;
                start = i + 1;
            }
            _ => {}
        }
    }
    scanner.segment(&body[start..])?;

    let compiled = scanner.finish()?;
    debug!(
        predicate = %compiled.predicate,
        arguments = compiled.arguments.len(),
        "compiled filter"
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    fn message(err: QueryError) -> String {
        match err {
            QueryError::MalformedFilter { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_single_clause() {
        let compiled = compile_filter("{age:gt:18}").unwrap();
        assert_eq!(compiled.predicate, "(age > :age0 )");
        assert_eq!(compiled.arguments.get(":age0"), Some(&text("18")));
        assert_eq!(compiled.columns.iter().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn test_combined_clauses() {
        let compiled = compile_filter("{a:eq:1|AND|b:!eq:2|OR|c:lte:3}").unwrap();
        assert_eq!(compiled.predicate, "(a = :a0 AND b <> :b1 OR c <= :c2 )");
        assert_eq!(
            compiled.arguments.keys().collect::<Vec<_>>(),
            vec![":a0", ":b1", ":c2"]
        );
    }

    #[test]
    fn test_like_wrapping() {
        let compiled = compile_filter("{n:sw:jo|OR|n:!ew:hn}").unwrap();
        assert_eq!(compiled.predicate, "(n LIKE :n0 OR n NOT LIKE :n1 )");
        assert_eq!(compiled.arguments.get(":n0"), Some(&text("jo%")));
        assert_eq!(compiled.arguments.get(":n1"), Some(&text("%hn")));
    }

    #[test]
    fn test_between() {
        let compiled = compile_filter("{age:btwn:18, 30}").unwrap();
        assert_eq!(compiled.predicate, "(age BETWEEN :age0 AND :age1 )");
        assert_eq!(compiled.arguments.get(":age0"), Some(&text("18")));
        assert_eq!(compiled.arguments.get(":age1"), Some(&text("30")));
    }

    #[test]
    fn test_in_list() {
        let compiled = compile_filter("{id:!in:1,2,3}").unwrap();
        assert_eq!(compiled.predicate, "(id NOT IN (:id0,:id1,:id2) )");
        assert_eq!(compiled.arguments.len(), 3);
    }

    #[test]
    fn test_in_list_keeps_empty_pieces() {
        let compiled = compile_filter("{a:in:1,,2}").unwrap();
        assert_eq!(compiled.predicate, "(a IN (:a0,:a1,:a2) )");
        assert_eq!(compiled.arguments.get(":a0"), Some(&text("1")));
        assert_eq!(compiled.arguments.get(":a1"), Some(&text("")));
        assert_eq!(compiled.arguments.get(":a2"), Some(&text("2")));

        let compiled = compile_filter("{a:!in:,}").unwrap();
        assert_eq!(compiled.predicate, "(a NOT IN (:a0,:a1) )");
        assert_eq!(compiled.arguments.get(":a0"), Some(&text("")));
        assert_eq!(compiled.arguments.get(":a1"), Some(&text("")));
    }

    #[test]
    fn test_between_keeps_empty_piece() {
        let compiled = compile_filter("{a:btwn:1,}").unwrap();
        assert_eq!(compiled.arguments.get(":a0"), Some(&text("1")));
        assert_eq!(compiled.arguments.get(":a1"), Some(&text("")));
    }

    #[test]
    fn test_bind_counts_and_outer_parentheses() {
        let cases = [
            ("{a:null}", 0),
            ("{a:btwn:1,2}", 2),
            ("{a:in:1,2,3|AND|b:eq:x}", 4),
            ("{(a:eq:1|OR|b:!null)|AND|c:!in:x,y}", 3),
            ("{x:contains:v|OR|(y:sw:w|AND|(z:btwn:1,2))}", 4),
        ];
        for (filter, binds) in cases {
            let compiled = compile_filter(filter).unwrap();
            assert_eq!(compiled.arguments.len(), binds, "{filter}");

            let mut depth = 0_usize;
            for (i, c) in compiled.predicate.char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            assert_eq!(i, compiled.predicate.len() - 1, "{filter}");
                        }
                    }
                    _ => {}
                }
            }
            assert_eq!(depth, 0, "{filter}");
            assert!(compiled.predicate.starts_with('('), "{filter}");
        }
    }

    #[test]
    fn test_null_adds_no_arguments() {
        let compiled = compile_filter("{deleted_at:null|AND|email:!null}").unwrap();
        assert_eq!(
            compiled.predicate,
            "(deleted_at IS NULL AND email IS NOT NULL )"
        );
        assert!(compiled.arguments.is_empty());
    }

    #[test]
    fn test_alias_stem() {
        let compiled = compile_filter("{u.name:eq:bob}").unwrap();
        assert_eq!(compiled.predicate, "(u.name = :u__name0 )");
        assert!(compiled.arguments.contains_key(":u__name0"));
        assert!(compiled.columns.contains("u.name"));
    }

    #[test]
    fn test_operand_may_contain_colons() {
        let compiled = compile_filter("{at:gte:2024-01-01 10:00:00}").unwrap();
        assert_eq!(compiled.arguments.get(":at0"), Some(&text("2024-01-01 10:00:00")));
    }

    #[test]
    fn test_nested_groups() {
        let compiled = compile_filter("{(a:eq:1|OR|(b:eq:2|AND|c:eq:3))|AND|d:null}").unwrap();
        assert_eq!(
            compiled.predicate,
            "((a = :a0 OR (b = :b1 AND c = :c2)) AND d IS NULL )"
        );
    }

    #[test]
    fn test_counter_collision_is_preserved() {
        let compiled = compile_filter("{a:btwn:1,2|AND|a:eq:9}").unwrap();
        assert_eq!(compiled.predicate, "(a BETWEEN :a0 AND :a1 AND a = :a1 )");
        assert_eq!(compiled.arguments.keys().collect::<Vec<_>>(), vec![":a0", ":a1"]);
        assert_eq!(compiled.arguments.get(":a1"), Some(&text("9")));
    }

    #[test]
    fn test_brace_errors() {
        assert_eq!(
            message(compile_filter("{}").unwrap_err()),
            "Empty filter statement provided"
        );
        assert_eq!(
            message(compile_filter("a:eq:1}").unwrap_err()),
            "Filter must start with '{'"
        );
        assert_eq!(
            message(compile_filter("{a:eq:1").unwrap_err()),
            "Filter must end with '}'"
        );
        assert!(compile_filter("{{a:eq:1}}").is_err());
    }

    #[test]
    fn test_combiner_placement_errors() {
        assert!(message(compile_filter("{AND|a:eq:1}").unwrap_err()).starts_with("First combiner"));
        assert!(message(compile_filter("{(OR|a:eq:1)}").unwrap_err()).contains("after '('"));
        assert!(message(compile_filter("{a:eq:1|AND}").unwrap_err()).starts_with("Ending combiner"));
        assert_eq!(
            message(compile_filter("{a:eq:1|AND|}").unwrap_err()),
            "Ending combiner operator without a succeeding clause disallowed"
        );
        assert!(message(compile_filter("{(a:eq:1|AND)}").unwrap_err()).starts_with("Ending combiner"));
        assert!(compile_filter("{a:eq:1|AND|OR|b:eq:2}").is_err());
    }

    #[test]
    fn test_structure_errors() {
        assert!(compile_filter("{a:eq:1|b:eq:2}").is_err());
        assert!(compile_filter("{a:eq:1(b:eq:2)}").is_err());
        assert!(compile_filter("{a:eq:1)|AND|(b:eq:2}").is_err());
        assert!(compile_filter("{(a:eq:1}").is_err());
        assert!(compile_filter("{()}").is_err());
    }

    #[test]
    fn test_clause_errors() {
        assert_eq!(
            message(compile_filter("{age}").unwrap_err()),
            "Clause missing the corresponding operation"
        );
        assert_eq!(
            message(compile_filter("{age:like:1}").unwrap_err()),
            "Unresolvable Operator 'like'"
        );
        assert!(compile_filter("{age:btwn:1}").is_err());
        assert!(compile_filter("{age:btwn:1,2,3}").is_err());
        assert!(compile_filter("{age:in:}").is_err());
        assert!(compile_filter("{age:eq:}").is_err());
        assert!(compile_filter("{age:eq: }").is_err());
        assert!(compile_filter("{age:eq:  |AND|b:null}").is_err());
        assert!(compile_filter("{age:null:1}").is_err());
    }

    #[test]
    fn test_offender_is_the_input() {
        match compile_filter("{a:eq:1|AND}").unwrap_err() {
            QueryError::MalformedFilter { offender, .. } => assert_eq!(offender, "{a:eq:1|AND}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bind_stem() {
        assert_eq!(bind_stem("u.first-name"), "u__first_name");
        assert_eq!(bind_stem("plain_col1"), "plain_col1");
    }
}
