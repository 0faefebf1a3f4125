//! Filter operators.

use std::fmt;

/// How many operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operand (`null`, `!null`).
    None,
    /// Exactly one operand.
    One,
    /// Exactly two comma-separated operands.
    Two,
    /// One or more comma-separated operands.
    AtLeastOne,
}

impl Arity {
    /// Returns true if `count` operands satisfy this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::None => count == 0,
            Self::One => count == 1,
            Self::Two => count == 2,
            Self::AtLeastOne => count >= 1,
        }
    }
}

/// A relation between a column and its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Looks up an operator by its DSL token. Tokens are case-sensitive.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Self::Equal),
            "!eq" => Some(Self::NotEqual),
            "gt" => Some(Self::GreaterThan),
            "gte" => Some(Self::GreaterThanOrEqual),
            "lt" => Some(Self::LessThan),
            "lte" => Some(Self::LessThanOrEqual),
            "contains" => Some(Self::Contains),
            "!contains" => Some(Self::NotContains),
            "sw" => Some(Self::StartsWith),
            "!sw" => Some(Self::NotStartsWith),
            "ew" => Some(Self::EndsWith),
            "!ew" => Some(Self::NotEndsWith),
            "btwn" => Some(Self::Between),
            "!btwn" => Some(Self::NotBetween),
            "in" => Some(Self::In),
            "!in" => Some(Self::NotIn),
            "null" => Some(Self::IsNull),
            "!null" => Some(Self::IsNotNull),
            _ => None,
        }
    }

    /// Returns the DSL token.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "!eq",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "lte",
            Self::Contains => "contains",
            Self::NotContains => "!contains",
            Self::StartsWith => "sw",
            Self::NotStartsWith => "!sw",
            Self::EndsWith => "ew",
            Self::NotEndsWith => "!ew",
            Self::Between => "btwn",
            Self::NotBetween => "!btwn",
            Self::In => "in",
            Self::NotIn => "!in",
            Self::IsNull => "null",
            Self::IsNotNull => "!null",
        }
    }

    /// Returns the SQL fragment placed between the column and its operands.
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Contains | Self::StartsWith | Self::EndsWith => "LIKE",
            Self::NotContains | Self::NotStartsWith | Self::NotEndsWith => "NOT LIKE",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns the human-readable name.
    #[must_use]
    pub const fn full_name(&self) -> &'static str {
        match self {
            Self::Equal => "Equal To",
            Self::NotEqual => "Not Equal To",
            Self::GreaterThan => "Greater Than",
            Self::GreaterThanOrEqual => "Greater Than Or Equal To",
            Self::LessThan => "Less Than",
            Self::LessThanOrEqual => "Less Than Or Equal To",
            Self::Contains => "Contains",
            Self::NotContains => "Not Containing",
            Self::StartsWith => "Starts With",
            Self::NotStartsWith => "Not Starting With",
            Self::EndsWith => "Ends With",
            Self::NotEndsWith => "Not Ending With",
            Self::Between => "Between",
            Self::NotBetween => "Not Between",
            Self::In => "In",
            Self::NotIn => "Not In",
            Self::IsNull => "Is Null",
            Self::IsNotNull => "Is Not Null",
        }
    }

    /// Returns the operand count the operator expects.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        match self {
            Self::IsNull | Self::IsNotNull => Arity::None,
            Self::Between | Self::NotBetween => Arity::Two,
            Self::In | Self::NotIn => Arity::AtLeastOne,
            _ => Arity::One,
        }
    }

    /// Returns true if the raw operand is a comma-separated list.
    #[must_use]
    pub const fn takes_list(&self) -> bool {
        matches!(self.arity(), Arity::Two | Arity::AtLeastOne)
    }

    /// Applies the `LIKE` wildcards, if any, to an operand.
    #[must_use]
    pub fn wrap_operand(&self, operand: &str) -> String {
        match self {
            Self::Contains | Self::NotContains => format!("%{operand}%"),
            Self::StartsWith | Self::NotStartsWith => format!("{operand}%"),
            Self::EndsWith | Self::NotEndsWith => format!("%{operand}"),
            _ => String::from(operand),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}
