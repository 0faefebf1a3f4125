//! Error types for query compilation.

use thiserror::Error;

/// Errors produced while compiling filters, rewriting parameters or
/// assembling statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The filter DSL text is structurally invalid.
    #[error("malformed filter: {message}. Offender: {offender}")]
    MalformedFilter {
        /// What is wrong with the filter.
        message: String,
        /// The portion of the input that triggered the error.
        offender: String,
    },

    /// One or more `:name` placeholders had no matching argument.
    #[error("unbound parameter(s): {}", .names.join(", "))]
    UnboundParameter {
        /// The placeholder names (with leading colon) that were not found.
        names: Vec<String>,
    },

    /// A builder method received invalid input.
    #[error("builder validation error: {0}")]
    BuilderValidation(String),

    /// Invalid page or page size.
    #[error("invalid page: {0}")]
    InvalidPage(String),
}

impl QueryError {
    /// Creates a `MalformedFilter` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>, offender: impl Into<String>) -> Self {
        Self::MalformedFilter {
            message: message.into(),
            offender: offender.into(),
        }
    }

    /// Creates a `BuilderValidation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::BuilderValidation(message.into())
    }
}

/// Result type alias for query compilation.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = QueryError::malformed("Empty filter statement provided", "{}");
        assert_eq!(
            err.to_string(),
            "malformed filter: Empty filter statement provided. Offender: {}"
        );
    }

    #[test]
    fn test_unbound_display() {
        let err = QueryError::UnboundParameter {
            names: vec![String::from(":a"), String::from(":b")],
        };
        assert_eq!(err.to_string(), "unbound parameter(s): :a, :b");
    }
}
