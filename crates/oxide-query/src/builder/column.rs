//! Select-list and sort-key helpers.

use std::fmt;

/// An aggregate applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Distinct,
    Count,
    Max,
    Min,
    Avg,
    Sum,
}

impl Aggregate {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Distinct => "DISTINCT",
            Self::Count => "COUNT",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Avg => "AVG",
            Self::Sum => "SUM",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A select-list entry: `[AGG(]name[)] [AS alias]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    alias: Option<String>,
    aggregate: Option<Aggregate>,
}

impl Column {
    /// Creates a plain column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            aggregate: None,
        }
    }

    /// Sets the `AS` alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Wraps the column in an aggregate.
    #[must_use]
    pub const fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.aggregate {
            Some(aggregate) => write!(f, "{}({})", aggregate.as_str(), self.name)?,
            None => f.write_str(&self.name)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An `ORDER BY` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    name: String,
    aggregate: Option<Aggregate>,
    order: Order,
}

impl SortKey {
    /// Sorts ascending on `name`.
    #[must_use]
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregate: None,
            order: Order::Asc,
        }
    }

    /// Sorts descending on `name`.
    #[must_use]
    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            order: Order::Desc,
            ..Self::asc(name)
        }
    }

    /// Sorts on an aggregate of the column.
    #[must_use]
    pub const fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.aggregate {
            Some(aggregate) => write!(f, "{}({})", aggregate.as_str(), self.name)?,
            None => f.write_str(&self.name)?,
        }
        write!(f, " {}", self.order.as_str())
    }
}

/// Joins rendered items with `, `.
pub(crate) fn join_rendered<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_rendering() {
        assert_eq!(Column::new("id").to_string(), "id");
        assert_eq!(
            Column::new("id").aggregate(Aggregate::Count).alias("total").to_string(),
            "COUNT(id) AS total"
        );
    }

    #[test]
    fn test_sort_keys() {
        let keys = [SortKey::desc("created_at"), SortKey::asc("amount").aggregate(Aggregate::Sum)];
        assert_eq!(join_rendered(&keys), "created_at DESC, SUM(amount) ASC");
    }
}
