//! Fluent statement builder.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::column::{join_rendered, Column, SortKey};
use crate::error::{QueryError, Result};
use crate::filter::{check_named_variable, compile_filter, FilterPredicate};
use crate::format::format_sql;
use crate::params::NamedParameterRewriter;
use crate::record::OrderedRecord;
use crate::value::SqlValue;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Fixed paging suffix; the values come from [`crate::Page::bind`].
pub const LIMIT_OFFSET: &str = " LIMIT :num_of_records OFFSET :offset ";

/// Assembles INSERT, UPDATE, DELETE and SELECT text.
///
/// Each call appends a fragment. The builder also remembers the table name,
/// where clause and join clause so that companion COUNT/EXISTS statements can
/// be derived for paging.
///
/// The first validation failure sticks: every later call is a no-op and
/// [`StatementBuilder::build`] returns the error.
///
/// ```rust
/// use oxide_query::StatementBuilder;
///
/// let sql = StatementBuilder::new()
///     .select()
///     .select_column("id")
///     .select_column("name")
///     .from_table("users")
///     .where_clause("(age > :age0 )")
///     .build()
///     .unwrap();
/// assert_eq!(sql, "SELECT id, name FROM users WHERE (age > :age0 )");
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct StatementBuilder {
    text: String,
    table_name: String,
    where_clause: String,
    join_clause: String,
    insert_columns: Vec<String>,
    select_columns: Vec<Column>,
    primary_key_column: String,
    primary_key_columns: Vec<String>,
    arguments: OrderedRecord,
    listing_columns: bool,
    error: Option<QueryError>,
}

impl StatementBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, fragment: &str) -> Self {
        if self.error.is_none() {
            self.text.push_str(fragment);
            self.listing_columns = false;
        }
        self
    }

    fn fail(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            let error = QueryError::validation(message);
            debug!(error = %error, "statement builder rejected input");
            self.error = Some(error);
        }
        self
    }

    fn adopt(mut self, error: QueryError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    fn set_table(self, table: &str, message: &str, fragment: String) -> Self {
        if self.error.is_some() {
            return self;
        }
        if table.is_empty() {
            return self.fail(message);
        }
        let mut builder = self.push(&fragment);
        builder.table_name = String::from(table);
        builder
    }

    // INSERT

    /// Appends `INSERT INTO `.
    pub fn insert(self) -> Self {
        self.push("INSERT INTO ")
    }

    /// Names the insert target.
    pub fn into(self, table: &str) -> Self {
        self.set_table(table, "INSERT: Table name is empty", format!("{table} "))
    }

    /// Appends the insert column list `(a,b)`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.insert_columns = columns.iter().map(|c| String::from(*c)).collect();
        let list = format!("({}) ", columns.join(","));
        self.push(&list)
    }

    /// Appends ` VALUES (:a,:b)`.
    ///
    /// Every entry must be a named variable (leading `:` or `@`), and when
    /// [`StatementBuilder::columns`] was called the counts must agree.
    pub fn values(self, variables: &[&str]) -> Self {
        if self.error.is_some() {
            return self;
        }
        if variables.is_empty() {
            return self.fail("INSERT: No insert values provided");
        }
        if let Some(bad) = variables
            .iter()
            .find(|v| !v.starts_with(':') && !v.starts_with('@'))
        {
            return self.fail(format!(
                "INSERT: '{bad}' named variable must start with full colon[:]"
            ));
        }
        if !self.insert_columns.is_empty() && self.insert_columns.len() != variables.len() {
            return self.fail("INSERT: Number of columns and values do not match");
        }
        let list = format!(" VALUES ({})", variables.join(","));
        self.push(&list)
    }

    /// Appends ` VALUES ` followed by prepared text.
    pub fn values_concatenated(self, values: &str) -> Self {
        if values.is_empty() {
            return self.fail("INSERT: No insert values provided");
        }
        self.push(&format!(" VALUES {values}"))
    }

    /// Appends `(sub-select)` as the insert source.
    pub fn values_from_select(self, select: &str) -> Self {
        self.push(&format!("({select}) "))
    }

    /// Appends `ON DUPLICATE KEY UPDATE c = :c, ...`.
    pub fn on_duplicate_key(self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            return self.fail("INSERT: No on duplicate values provided");
        }
        let assignments: Vec<String> = columns.iter().map(|c| format!("{c} = :{c}")).collect();
        self.push(&format!(" ON DUPLICATE KEY UPDATE {}", assignments.join(", ")))
    }

    // UPDATE

    /// Appends `UPDATE table SET `.
    pub fn update(self, table: &str) -> Self {
        self.set_table(
            table,
            "UPDATE: Table name is empty",
            format!("UPDATE {table} SET "),
        )
    }

    /// Appends `column = :variable` assignments.
    ///
    /// Every value must be a named variable with a leading `:`.
    pub fn set(self, assignments: &OrderedRecord<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if assignments.is_empty() {
            return self.fail("UPDATE: Update set columns missing");
        }
        for (column, variable) in assignments {
            if column.is_empty() {
                return self.fail("UPDATE: Update column is empty");
            }
            if variable.len() < 2 {
                return self.fail("UPDATE: named variable for update is empty");
            }
            if !variable.starts_with(':') {
                return self.fail(format!(
                    "UPDATE: '{variable}' named variable must start with full colon[:] in SET"
                ));
            }
        }
        self.special_set(assignments)
    }

    /// Appends assignments without validating them (for expressions such as
    /// `counter = counter + 1`).
    pub fn special_set(self, assignments: &OrderedRecord<String>) -> Self {
        let text = assignments
            .iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.push(&text)
    }

    /// Appends ` RETURNING phrase`.
    pub fn returning(self, phrase: &str) -> Self {
        if phrase.trim().is_empty() {
            return self.fail("RETURNING STATEMENT: returning statement should not be empty");
        }
        self.push(&format!(" RETURNING {phrase}"))
    }

    // DELETE

    /// Appends `DELETE FROM table `.
    pub fn delete_from(self, table: &str) -> Self {
        self.set_table(
            table,
            "DELETE: Table name is empty",
            format!("DELETE FROM {table} "),
        )
    }

    // SELECT

    /// Appends `SELECT `.
    pub fn select(self) -> Self {
        self.push("SELECT ")
    }

    /// Appends raw SQL.
    pub fn raw(self, sql: &str) -> Self {
        self.push(&format!("{sql} "))
    }

    /// Puts text in front of everything accumulated so far.
    pub fn prepend(mut self, sql: &str) -> Self {
        if self.error.is_none() {
            self.text = format!("{sql}{} ", self.text);
            self.listing_columns = false;
        }
        self
    }

    /// Appends text followed by a space.
    pub fn append(self, sql: &str) -> Self {
        self.raw(sql)
    }

    /// Appends one select-list entry, comma-separated from the previous one.
    pub fn select_column(self, column: impl Into<Column>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let column = column.into();
        let separator = if self.listing_columns { ", " } else { "" };
        let mut builder = self.push(&format!("{separator}{column}"));
        builder.select_columns.push(column);
        builder.listing_columns = true;
        builder
    }

    /// Appends several select-list entries.
    pub fn select_columns(self, columns: impl IntoIterator<Item = Column>) -> Self {
        columns
            .into_iter()
            .fold(self, |builder, column| builder.select_column(column))
    }

    /// Appends ` FROM table `.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_table(self, table: &str) -> Self {
        self.set_table(
            table,
            "SELECT: Table name is empty",
            format!(" FROM {table} "),
        )
    }

    /// Appends a bare ` FROM `, for use before [`StatementBuilder::join_phrase`].
    #[allow(clippy::should_implement_trait)]
    pub fn from(self) -> Self {
        self.push(" FROM ")
    }

    /// Appends ` WHERE clause ` and remembers the clause.
    ///
    /// The clause must be non-empty with balanced parentheses.
    pub fn where_clause(self, clause: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if clause.is_empty() {
            return self.fail("WHERE: where clause is empty");
        }
        if clause.matches('(').count() != clause.matches(')').count() {
            return self.fail(format!(
                "WHERE CLAUSE: Number of '(' do not match number of ')' in: {clause}"
            ));
        }
        let mut builder = self.push(&format!(" WHERE {clause} "));
        builder.where_clause = String::from(clause);
        builder
    }

    /// Compiles a filter and uses it as the where clause. Its arguments are
    /// kept for [`StatementBuilder::prepare`].
    pub fn where_filter(mut self, filter: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match compile_filter(filter) {
            Ok(compiled) => {
                self.arguments.extend_from(&compiled.arguments);
                self.where_clause(&compiled.predicate)
            }
            Err(error) => self.adopt(error),
        }
    }

    /// Uses a hand-built predicate as the where clause.
    pub fn where_predicate(self, predicate: &FilterPredicate) -> Self {
        match predicate.error() {
            Some(error) => self.adopt(error.clone()),
            None => self.where_clause(predicate.clause()),
        }
    }

    /// Appends ` GROUP BY columns `.
    pub fn group_by(self, columns: &str) -> Self {
        if columns.is_empty() {
            return self.fail("GROUP: group by columns must not be empty");
        }
        self.push(&format!(" GROUP BY {columns} "))
    }

    /// Appends ` HAVING clause `.
    pub fn having(self, clause: &str) -> Self {
        if clause.is_empty() {
            return self.fail("HAVING: Having clause is empty");
        }
        self.push(&format!(" HAVING {clause} "))
    }

    /// Uses a hand-built predicate as the having clause.
    pub fn having_predicate(self, predicate: &FilterPredicate) -> Self {
        match predicate.error() {
            Some(error) => self.adopt(error.clone()),
            None => self.having(predicate.clause()),
        }
    }

    /// Appends ` ORDER BY text `.
    pub fn order_by(self, order_by: &str) -> Self {
        if order_by.is_empty() {
            return self.fail("Order By clause cannot be empty");
        }
        self.push(&format!(" ORDER BY {order_by} "))
    }

    /// Appends ` ORDER BY ` over sort keys.
    pub fn order_by_keys(self, keys: &[SortKey]) -> Self {
        if keys.iter().any(|k| k.name().is_empty()) {
            return self.fail("ORDER BY: order by column cannot be empty");
        }
        self.order_by(&join_rendered(keys))
    }

    // CASE

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
        self.push(&format!("THEN {variable} "))
    }

    /// Appends `ELSE`, followed by `variable` when given.
    pub fn else_(self, variable: Option<&str>) -> Self {
        let Some(variable) = variable else {
            return self.push(" ELSE ");
        };
        if let Err(message) = check_named_variable(variable, "ELSE CLAUSE IN CASE") {
            return self.fail(message);
        }
        self.push(&format!("ELSE {variable} "))
    }

    /// Closes the `CASE`.
    pub fn end(self, trailing_comma: bool) -> Self {
        self.push(if trailing_comma { "END), " } else { "END) " })
    }

    /// Closes the `CASE` under `alias`.
    pub fn end_as(self, alias: &str, trailing_comma: bool) -> Self {
        let tail = if trailing_comma { "), " } else { ") " };
        self.push(&format!("END AS {alias}{tail}"))
    }

    // Paging, unions, joins

    /// Appends the fixed ` LIMIT :num_of_records OFFSET :offset ` suffix.
    pub fn limit(self) -> Self {
        self.push(LIMIT_OFFSET)
    }

    /// Appends `preceding UNION following`.
    pub fn union(self, preceding: &str, following: &str) -> Self {
        self.push(&format!("{preceding} UNION {following} "))
    }

    /// Appends `preceding UNION ALL following`.
    pub fn union_all(self, preceding: &str, following: &str) -> Self {
        self.push(&format!("{preceding} UNION ALL {following} "))
    }

    /// Appends a join phrase and remembers it.
    pub fn join_phrase(self, phrase: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if phrase.trim().is_empty() {
            return self.fail("JOIN STATEMENT: join statement should not be empty");
        }
        let mut builder = self.push(phrase);
        builder.join_clause.push_str(phrase);
        builder
    }

    // Metadata

    /// Records the primary key column.
    pub fn set_primary_key_column(mut self, column: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if column.trim().is_empty() {
            return self.fail("SetPrimaryKeyColumn: column cannot be empty");
        }
        self.primary_key_column = String::from(column);
        self
    }

    /// Adds a column to the composite primary key.
    pub fn add_primary_key_column(mut self, column: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if column.trim().is_empty() {
            return self.fail("AddPrimaryKeyColumns: column cannot be empty");
        }
        self.primary_key_columns.push(String::from(column));
        self
    }

    /// Adds a bind argument used by [`StatementBuilder::prepare`].
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        if self.error.is_none() {
            self.arguments.insert(name, value.into());
        }
        self
    }

    /// Returns the table named by `into`, `update`, `delete_from` or
    /// `from_table`.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the where clause, without the `WHERE` keyword.
    #[must_use]
    pub fn where_text(&self) -> &str {
        &self.where_clause
    }

    /// Returns the accumulated join phrases.
    #[must_use]
    pub fn join_text(&self) -> &str {
        &self.join_clause
    }

    /// Returns the insert column list.
    #[must_use]
    pub fn insert_columns(&self) -> &[String] {
        &self.insert_columns
    }

    /// Returns the select-list entries added through `select_column`.
    #[must_use]
    pub fn selected_columns(&self) -> &[Column] {
        &self.select_columns
    }

    /// Returns the primary key column.
    #[must_use]
    pub fn primary_key_column(&self) -> &str {
        &self.primary_key_column
    }

    /// Returns the composite primary key columns.
    #[must_use]
    pub fn primary_key_columns(&self) -> &[String] {
        &self.primary_key_columns
    }

    /// Returns the arguments gathered from filters and `bind`.
    #[must_use]
    pub const fn arguments(&self) -> &OrderedRecord {
        &self.arguments
    }

    /// Returns the first validation error.
    #[must_use]
    pub const fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// Returns the statement text, trimmed with whitespace runs collapsed,
    /// whether or not an error was recorded.
    #[must_use]
    pub fn to_sql_string(&self) -> String {
        WHITESPACE_RUN
            .replace_all(self.text.trim(), " ")
            .into_owned()
    }

    /// Returns the statement laid out by [`format_sql`], for logs.
    #[must_use]
    pub fn pretty(&self) -> String {
        format_sql(&self.to_sql_string())
    }

    /// Returns the statement text, or the first validation error.
    ///
    /// # Errors
    ///
    /// Returns the [`QueryError::BuilderValidation`] (or filter error)
    /// recorded by the first call that failed.
    pub fn build(&self) -> Result<String> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.to_sql_string()),
        }
    }

    /// Builds the statement and rewrites it to `$n` markers, binding the
    /// builder's own arguments plus `arguments` (which win on conflict).
    ///
    /// # Errors
    ///
    /// Fails with the builder's error, or with
    /// [`QueryError::UnboundParameter`] when a placeholder has no argument.
    pub fn prepare(&self, arguments: &OrderedRecord) -> Result<(String, Vec<SqlValue>)> {
        self.prepare_with(&NamedParameterRewriter::default(), arguments)
    }

    /// Like [`StatementBuilder::prepare`] with a chosen marker style.
    ///
    /// # Errors
    ///
    /// See [`StatementBuilder::prepare`].
    pub fn prepare_with(
        &self,
        rewriter: &NamedParameterRewriter,
        arguments: &OrderedRecord,
    ) -> Result<(String, Vec<SqlValue>)> {
        let sql = self.build()?;
        let mut all = self.arguments.clone();
        all.extend_from(arguments);
        let (sql, values) = rewriter.rewrite(&sql, &all).check()?;
        debug!(sql = %sql, values = values.len(), "prepared statement");
        Ok((sql, values))
    }
}

impl fmt::Display for StatementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_string())
    }
}
