//! Delimiter-driven tokenizer implementation.

use super::{Span, Token};

/// A tokenizer that splits its input on a set of delimiter characters.
///
/// When `return_delimiters` is set every delimiter character comes back as a
/// one-character token; otherwise runs of delimiters are skipped.
///
/// ```rust
/// use oxide_query::lexer::Tokenizer;
///
/// let words: Vec<&str> = Tokenizer::new("a, b,,c", ", ", false)
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(words, vec!["a", "b", "c"]);
///
/// let all: Vec<&str> = Tokenizer::new("f(x)", "()", true)
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(all, vec!["f", "(", "x", ")"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// Delimiter characters.
    delimiters: Vec<char>,
    /// Largest delimiter, for a cheap rejection test.
    max_delimiter: char,
    /// Whether delimiters are returned as tokens.
    return_delimiters: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `input` splitting on every character of
    /// `delimiters`.
    #[must_use]
    pub fn new(input: &'a str, delimiters: &str, return_delimiters: bool) -> Self {
        let mut tokenizer = Self {
            input,
            pos: 0,
            delimiters: Vec::new(),
            max_delimiter: '\0',
            return_delimiters,
        };
        tokenizer.set_delimiters(delimiters);
        tokenizer
    }

    /// Replaces the delimiter set; takes effect from the current position.
    pub fn set_delimiters(&mut self, delimiters: &str) {
        self.delimiters = delimiters.chars().collect();
        self.max_delimiter = self.delimiters.iter().copied().max().unwrap_or('\0');
    }

    /// Returns true if `c` is one of the delimiters.
    #[must_use]
    pub fn is_delimiter(&self, c: char) -> bool {
        c <= self.max_delimiter && self.delimiters.contains(&c)
    }

    /// Returns the byte position of the next unread character.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the first position at or after `from` that is not a skipped
    /// delimiter.
    fn skip_delimiters(&self, from: usize) -> usize {
        if self.return_delimiters {
            return from;
        }
        let rest = &self.input[from..];
        rest.char_indices()
            .find(|&(_, c)| !self.is_delimiter(c))
            .map_or(self.input.len(), |(i, _)| from + i)
    }

    /// Returns the end of the token starting at `from`.
    fn scan_token(&self, from: usize) -> usize {
        let rest = &self.input[from..];
        let end = rest
            .char_indices()
            .find(|&(_, c)| self.is_delimiter(c))
            .map_or(self.input.len(), |(i, _)| from + i);

        if self.return_delimiters && end == from {
            // A lone delimiter is a token of its own.
            return rest.chars().next().map_or(end, |c| from + c.len_utf8());
        }
        end
    }

    /// Returns true if another token is available.
    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        self.skip_delimiters(self.pos) < self.input.len()
    }

    /// Returns the next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let start = self.skip_delimiters(self.pos);
        if start >= self.input.len() {
            self.pos = self.input.len();
            return None;
        }
        let end = self.scan_token(start);
        self.pos = end;

        let text = &self.input[start..end];
        let is_delimiter = text.chars().next().is_some_and(|c| self.is_delimiter(c));
        Some(Token::new(text, Span::new(start, end), is_delimiter))
    }

    /// Switches to a new delimiter set and returns the next token.
    pub fn next_token_with(&mut self, delimiters: &str) -> Option<Token<'a>> {
        self.set_delimiters(delimiters);
        self.next_token()
    }

    /// Counts the tokens remaining without consuming them.
    #[must_use]
    pub fn count_tokens(&self) -> usize {
        let mut count = 0;
        let mut pos = self.pos;
        loop {
            pos = self.skip_delimiters(pos);
            if pos >= self.input.len() {
                break;
            }
            pos = self.scan_token(pos);
            count += 1;
        }
        count
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str, delimiters: &str, return_delimiters: bool) -> Vec<String> {
        Tokenizer::new(input, delimiters, return_delimiters)
            .map(|t| String::from(t.text))
            .collect()
    }

    #[test]
    fn test_skip_delimiters() {
        assert_eq!(texts("  a  b c ", " ", false), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_return_delimiters() {
        assert_eq!(
            texts("a = b", " =", true),
            vec!["a", " ", "=", " ", "b"]
        );
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = Tokenizer::new("", " ", true);
        assert!(!tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token(), None);
    }

    #[test]
    fn test_only_delimiters_skipped() {
        let tokenizer = Tokenizer::new(" ,, ", " ,", false);
        assert!(!tokenizer.has_more_tokens());
        assert_eq!(tokenizer.count_tokens(), 0);
    }

    #[test]
    fn test_count_tokens_does_not_consume() {
        let mut tokenizer = Tokenizer::new("x(y)", "()", true);
        assert_eq!(tokenizer.count_tokens(), 4);
        assert_eq!(tokenizer.next_token().map(|t| t.text), Some("x"));
        assert_eq!(tokenizer.count_tokens(), 3);
    }

    #[test]
    fn test_spans_and_flags() {
        let tokens: Vec<Token<'_>> = Tokenizer::new("ab,c", ",", true).collect();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert!(!tokens[0].is_delimiter);
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert!(tokens[1].is_delimiter);
        assert_eq!(tokens[2].text, "c");
    }

    #[test]
    fn test_multibyte_input() {
        assert_eq!(
            texts("naïve→café", "→", true),
            vec!["naïve", "→", "café"]
        );
    }

    #[test]
    fn test_switch_delimiters_mid_stream() {
        let mut tokenizer = Tokenizer::new("a b;c d", " ", false);
        assert_eq!(tokenizer.next_token().map(|t| t.text), Some("a"));
        assert_eq!(tokenizer.next_token_with(";").map(|t| t.text), Some(" b"));
        assert_eq!(tokenizer.next_token().map(|t| t.text), Some("c d"));
        assert_eq!(tokenizer.next_token(), None);
    }
}
