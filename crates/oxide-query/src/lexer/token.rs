//! Tokens and source spans.

/// A byte range in the tokenized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A slice of the input produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token text, borrowed from the input.
    pub text: &'a str,
    /// Where the token sits in the input.
    pub span: Span,
    /// True when the token is a single delimiter character.
    pub is_delimiter: bool,
}

impl<'a> Token<'a> {
    /// Creates a token.
    #[must_use]
    pub const fn new(text: &'a str, span: Span, is_delimiter: bool) -> Self {
        Self {
            text,
            span,
            is_delimiter,
        }
    }

    /// Returns true if the token is a whitespace delimiter.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.is_delimiter && self.text.chars().all(char::is_whitespace)
    }
}
