//! Hand-written predicate builder.
//!
//! Where the filter DSL is too narrow (sub-queries, `CASE`, `ILIKE`),
//! callers assemble predicate text fluently. Every comparison takes a named
//! variable such as `:min_age`; the values are bound later by the rewriter.

use std::fmt;

use crate::error::{QueryError, Result};

/// Fluent predicate text builder.
///
/// The first validation failure is kept and later calls become no-ops;
/// [`FilterPredicate::build`] reports it.
///
/// ```rust
/// use oxide_query::FilterPredicate;
///
/// let predicate = FilterPredicate::new()
///     .open()
///     .gte("age", ":min_age")
///     .and()
///     .is_not_null("email")
///     .close()
///     .build()
///     .unwrap();
/// assert_eq!(predicate, "( age >= :min_age  AND email IS NOT NULL )");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct FilterPredicate {
    clause: String,
    error: Option<QueryError>,
}

impl FilterPredicate {
    /// Creates an empty predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a predicate starting with `clause`.
    pub fn with_clause(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            error: None,
        }
    }

    fn push(mut self, text: &str) -> Self {
        if self.error.is_none() {
            self.clause.push_str(text);
        }
        self
    }

    fn fail(mut self, message: String) -> Self {
        if self.error.is_none() {
            self.error = Some(QueryError::BuilderValidation(message));
        }
        self
    }

    /// Appends `column <op> <variable>` after validating both.
    fn compare(self, location: &str, column: &str, op: &str, variable: &str) -> Self {
        if column.is_empty() {
            return self.fail(format!("{location}: Column name is empty"));
        }
        if let Err(message) = check_named_variable(variable, location) {
            return self.fail(message);
        }
        self.push(&format!(" {column} {op} {variable} "))
    }

    /// Appends `column <op> (<sub-query>)` after validating both.
    fn compare_subquery(self, location: &str, column: &str, op: &str, subquery: &str) -> Self {
        if column.is_empty() {
            return self.fail(format!("{location}: Column name is empty"));
        }
        if subquery.is_empty() {
            return self.fail(format!("{location}: Sub-query is empty"));
        }
        self.push(&format!(" {column} {op} ({subquery}) "))
    }

    /// Appends `(`.
    pub fn open(self) -> Self {
        self.push("(")
    }

    /// Appends `)`.
    pub fn close(self) -> Self {
        self.push(")")
    }

    /// Appends ` AND `.
    pub fn and(self) -> Self {
        self.push(" AND ")
    }

    /// Appends ` OR `.
    pub fn or(self) -> Self {
        self.push(" OR ")
    }

    /// Appends ` NOT `.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.push(" NOT ")
    }

    /// Appends `column IS NULL`.
    pub fn is_null(self, column: &str) -> Self {
        self.push(&format!("{column} IS NULL "))
    }

    /// Appends `column IS NOT NULL`.
    pub fn is_not_null(self, column: &str) -> Self {
        self.push(&format!("{column} IS NOT NULL "))
    }

    /// Appends raw predicate text.
    pub fn custom(self, filter: &str) -> Self {
        self.push(&format!(" {filter} "))
    }

    /// Appends `column LIKE variable`.
    pub fn like(self, column: &str, variable: &str) -> Self {
        self.compare("LIKE", column, "LIKE", variable)
    }

    /// Appends `column ILIKE variable`.
    pub fn ilike(self, column: &str, variable: &str) -> Self {
        self.compare("ILIKE", column, "ILIKE", variable)
    }

    /// Appends `column IN (phrase)`.
    pub fn in_phrase(self, column: &str, phrase: &str) -> Self {
        self.list("IN", column, phrase)
    }

    /// Appends `column NOT IN (phrase)`.
    pub fn not_in_phrase(self, column: &str, phrase: &str) -> Self {
        self.list("NOT IN", column, phrase)
    }

    fn list(self, op: &str, column: &str, phrase: &str) -> Self {
        if column.is_empty() {
            return self.fail(format!("{op}: Column name is empty"));
        }
        if phrase.is_empty() {
            return self.fail(format!("{op}: Phrase is empty"));
        }
        self.push(&format!(" {column} {op} ({phrase}) "))
    }

    /// Appends `column BETWEEN low AND high`.
    pub fn between(self, column: &str, low: &str, high: &str) -> Self {
        if column.is_empty() {
            return self.fail(String::from("BETWEEN: Column name is empty"));
        }
        if let Err(message) = check_named_variable(low, "BETWEEN")
            .and_then(|()| check_named_variable(high, "BETWEEN"))
        {
            return self.fail(message);
        }
        self.push(&format!(" {column} BETWEEN {low} AND {high} "))
    }

    /// Appends `column = variable`.
    pub fn eq(self, column: &str, variable: &str) -> Self {
        self.compare("EQUAL TO", column, "=", variable)
    }

    /// Appends `column <> variable`.
    pub fn ne(self, column: &str, variable: &str) -> Self {
        self.compare("NOT EQUAL TO", column, "<>", variable)
    }

    /// Appends `column < variable`.
    pub fn lt(self, column: &str, variable: &str) -> Self {
        self.compare("LESS THAN", column, "<", variable)
    }

    /// Appends `column <= variable`.
    pub fn lte(self, column: &str, variable: &str) -> Self {
        self.compare("LESS THAN OR EQUAL TO", column, "<=", variable)
    }

    /// Appends `column > variable`.
    pub fn gt(self, column: &str, variable: &str) -> Self {
        self.compare("GREATER THAN", column, ">", variable)
    }

    /// Appends `column >= variable`.
    pub fn gte(self, column: &str, variable: &str) -> Self {
        self.compare("GREATER THAN OR EQUAL TO", column, ">=", variable)
    }

    /// Appends `column = (subquery)`.
    pub fn eq_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("EQUAL TO", column, "=", subquery)
    }

    /// Appends `column <> (subquery)`.
    pub fn ne_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("NOT EQUAL TO", column, "<>", subquery)
    }

    /// Appends `column < (subquery)`.
    pub fn lt_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("LESS THAN", column, "<", subquery)
    }

    /// Appends `column <= (subquery)`.
    pub fn lte_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("LESS THAN OR EQUAL TO", column, "<=", subquery)
    }

    /// Appends `column > (subquery)`.
    pub fn gt_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("GREATER THAN", column, ">", subquery)
    }

    /// Appends `column >= (subquery)`.
    pub fn gte_subquery(self, column: &str, subquery: &str) -> Self {
        self.compare_subquery("GREATER THAN OR EQUAL TO", column, ">=", subquery)
    }

    /// Appends `ANY (subquery)`.
    pub fn any(self, subquery: &str) -> Self {
        self.push(&format!(" ANY ({subquery}) "))
    }

    /// Appends `ALL (subquery)`.
    pub fn all(self, subquery: &str) -> Self {
        self.push(&format!(" ALL ({subquery}) "))
    }

    /// Appends `EXISTS (subquery)`.
    pub fn exists(self, subquery: &str) -> Self {
        self.push(&format!(" EXISTS ({subquery}) "))
    }

    /// Appends `SOME (subquery)`.
    pub fn some(self, subquery: &str) -> Self {
        self.push(&format!(" SOME ({subquery}) "))
    }

    /// Opens a parenthesised `CASE`.
    pub fn case_(self) -> Self {
        self.push("(CASE ")
    }

    /// Appends `WHEN condition`.
    pub fn when(self, condition: &str) -> Self {
        self.push(&format!("WHEN {condition} "))
    }

    /// Appends `THEN variable`.
    pub fn then(self, variable: &str) -> Self {
        if let Err(message) = check_named_variable(variable, "THEN CLAUSE IN CASE") {
            return self.fail(message);
        }
        self.push(&format!(" THEN {variable} "))
    }

    /// Appends `ELSE`, followed by `variable` when given.
    pub fn else_(self, variable: Option<&str>) -> Self {
        match variable {
            None => self.push(" ELSE "),
            Some(variable) => {
                if let Err(message) = check_named_variable(variable, "ELSE CLAUSE IN CASE") {
                    return self.fail(message);
                }
                self.push(&format!(" ELSE {variable} "))
            }
        }
    }

    /// Closes the `CASE`, with a trailing comma when more follows.
    pub fn end(self, trailing_comma: bool) -> Self {
        self.push(if trailing_comma { "END), " } else { "END) " })
    }

    /// Closes the `CASE` under `alias`.
    pub fn end_as(self, alias: &str, trailing_comma: bool) -> Self {
        let tail = if trailing_comma { "), " } else { ") " };
        self.push(&format!("END AS {alias}{tail}"))
    }

    /// Appends the text of another predicate and adopts its error, if any.
    pub fn extend(mut self, other: &Self) -> Self {
        if self.error.is_none() {
            if let Some(error) = &other.error {
                self.error = Some(error.clone());
                return self;
            }
        }
        self.push(&format!(" {}", other.clause))
    }

    /// Returns the text accumulated so far.
    #[must_use]
    pub fn clause(&self) -> &str {
        &self.clause
    }

    /// Returns the first validation error.
    #[must_use]
    pub const fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// Returns the predicate text, or the first validation error.
    ///
    /// # Errors
    ///
    /// Returns the [`QueryError::BuilderValidation`] recorded by the first
    /// call that failed.
    pub fn build(self) -> Result<String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.clause),
        }
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clause)
    }
}

/// Checks a `:name` variable: at least two characters, a leading colon and no
/// other colon.
pub(crate) fn check_named_variable(variable: &str, location: &str) -> std::result::Result<(), String> {
    if variable.len() < 2 {
        return Err(format!("{location}: namedVariable is empty"));
    }
    if !variable.starts_with(':') {
        return Err(format!(
            "{location}: '{variable}' named variable must start with full colon[:]"
        ));
    }
    if variable.matches(':').count() > 1 {
        return Err(format!(
            "{location}: '{variable}' can only have one full colon[:]"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons() {
        let text = FilterPredicate::new()
            .eq("a", ":a")
            .or()
            .lt_subquery("b", "SELECT max(b) FROM t")
            .build()
            .unwrap();
        assert_eq!(text, " a = :a  OR  b < (SELECT max(b) FROM t) ");
    }

    #[test]
    fn test_between_and_lists() {
        let text = FilterPredicate::new()
            .between("age", ":lo", ":hi")
            .and()
            .not_in_phrase("id", "1,2")
            .to_string();
        assert_eq!(text, " age BETWEEN :lo AND :hi  AND  id NOT IN (1,2) ");
    }

    #[test]
    fn test_case_expression() {
        let text = FilterPredicate::new()
            .case_()
            .when("a > 1")
            .then(":big")
            .else_(Some(":small"))
            .end_as("size", false)
            .build()
            .unwrap();
        assert_eq!(text, "(CASE WHEN a > 1  THEN :big  ELSE :small END AS size) ");
    }

    #[test]
    fn test_error_is_sticky() {
        let predicate = FilterPredicate::new()
            .eq("a", "missing_colon")
            .and()
            .eq("", ":b");
        assert_eq!(predicate.clause(), "");
        assert_eq!(
            predicate.build(),
            Err(QueryError::BuilderValidation(String::from(
                "EQUAL TO: 'missing_colon' named variable must start with full colon[:]"
            )))
        );
    }

    #[test]
    fn test_named_variable_checks() {
        assert!(FilterPredicate::new().gt("a", ":").build().is_err());
        assert!(FilterPredicate::new().gt("a", ":x:y").build().is_err());
        assert!(FilterPredicate::new().like("", ":x").build().is_err());
        assert!(FilterPredicate::new().in_phrase("a", "").build().is_err());
        assert!(FilterPredicate::new().eq_subquery("a", "").build().is_err());
    }

    #[test]
    fn test_extend_copies_text_and_error() {
        let inner = FilterPredicate::new().is_null("x");
        let outer = FilterPredicate::with_clause("y = 1").and().extend(&inner);
        assert_eq!(outer.clause(), "y = 1 AND  x IS NULL ");

        let broken = FilterPredicate::new().then("nope");
        assert!(FilterPredicate::new().extend(&broken).build().is_err());
    }
}
