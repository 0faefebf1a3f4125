//! Positional marker styles.
//!
//! Different drivers expect different positional syntax. The rewriter only
//! ever translates named parameters into one of these; no other dialect
//! differences are handled.

use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// The positional marker emitted for each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1`, `$2`, ... (PostgreSQL).
    #[default]
    Dollar,
    /// `?1`, `?2`, ... (SQLite).
    QuestionNumbered,
    /// `?` for every marker (MySQL, ODBC).
    Question,
}

impl Placeholder {
    /// Returns the name of the style.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dollar => "dollar",
            Self::QuestionNumbered => "numbered",
            Self::Question => "question",
        }
    }

    /// Appends the marker for the 1-based position `index` to `out`.
    pub fn write_marker(&self, out: &mut String, index: usize) {
        match self {
            Self::Dollar => {
                out.push('$');
                out.push_str(&index.to_string());
            }
            Self::QuestionNumbered => {
                out.push('?');
                out.push_str(&index.to_string());
            }
            Self::Question => out.push('?'),
        }
    }

    /// Returns the marker for the 1-based position `index`.
    #[must_use]
    pub fn marker(&self, index: usize) -> String {
        let mut out = String::new();
        self.write_marker(&mut out, index);
        out
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Placeholder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dollar" | "postgres" | "pg" => Ok(Self::Dollar),
            "numbered" | "sqlite" => Ok(Self::QuestionNumbered),
            "question" | "mysql" => Ok(Self::Question),
            other => Err(QueryError::validation(format!(
                "unknown placeholder style '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(Placeholder::Dollar.marker(3), "$3");
        assert_eq!(Placeholder::QuestionNumbered.marker(12), "?12");
        assert_eq!(Placeholder::Question.marker(7), "?");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("PG".parse::<Placeholder>(), Ok(Placeholder::Dollar));
        assert_eq!("sqlite".parse::<Placeholder>(), Ok(Placeholder::QuestionNumbered));
        assert_eq!("mysql".parse::<Placeholder>(), Ok(Placeholder::Question));
        assert!("oracle".parse::<Placeholder>().is_err());
    }

    #[test]
    fn test_default_is_dollar() {
        assert_eq!(Placeholder::default(), Placeholder::Dollar);
        assert_eq!(Placeholder::default().to_string(), "dollar");
    }
}
