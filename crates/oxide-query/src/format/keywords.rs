//! Keyword classes driving the layout decisions.

/// The layout role of a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    /// Opens a compound clause (`LEFT`, `GROUP`, ...).
    Begin,
    /// Starts a clause body (`WHERE`, `FROM`, `BY`, ...).
    End,
    /// Boolean and `CASE` connectives.
    Logical,
    /// Sub-query quantifiers.
    Quantifier,
    /// Data-manipulation statements.
    Dml,
    /// `SELECT` and `ON`.
    Misc,
}

impl KeywordClass {
    /// Classifies a lowercase token.
    #[must_use]
    pub fn of(lowercase: &str) -> Option<Self> {
        match lowercase {
            "left" | "right" | "inner" | "outer" | "group" | "order" => Some(Self::Begin),
            "where" | "set" | "having" | "join" | "from" | "by" | "into" | "union" => {
                Some(Self::End)
            }
            "and" | "or" | "when" | "else" | "end" => Some(Self::Logical),
            "in" | "all" | "exists" | "some" | "any" => Some(Self::Quantifier),
            "insert" | "update" | "delete" => Some(Self::Dml),
            "select" | "on" => Some(Self::Misc),
            _ => None,
        }
    }
}

/// Returns true if a `(` after this lowercase token opens a call's argument
/// list.
///
/// Anything other than a logical, end-clause, quantifier, DML or misc keyword
/// counts, including the empty token at the start of the input.
#[must_use]
pub fn is_function_name(lowercase: &str) -> bool {
    !matches!(
        KeywordClass::of(lowercase),
        Some(
            KeywordClass::Logical
                | KeywordClass::End
                | KeywordClass::Quantifier
                | KeywordClass::Dml
                | KeywordClass::Misc
        )
    )
}
