//! SQL pretty printer.

use tracing::debug;

use super::keywords::{is_function_name, KeywordClass};
use crate::lexer::Tokenizer;

/// Characters that split the input; each one is also a token.
const DELIMITERS: &str = "()+*/-=<>'\"[], \n\r\x0c\t";

/// Layout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// One level of indentation.
    pub indent: String,
    /// Text written before the first token.
    pub initial: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: String::from("    "),
            initial: String::from("\n"),
        }
    }
}

/// Reformats SQL into indented, clause-aligned text for logs.
///
/// ```rust
/// use oxide_query::format_sql;
///
/// let pretty = format_sql("select a from t where x = 1");
/// assert_eq!(pretty, "\nselect\n        a \n    from\n        t \n    where\n        x = 1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SqlFormatter {
    options: FormatOptions,
}

impl SqlFormatter {
    /// Creates a formatter with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with custom layout settings.
    #[must_use]
    pub const fn with_options(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Returns the layout settings.
    #[must_use]
    pub const fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Formats `sql`.
    ///
    /// Never fails. Input the layout rules cannot follow (a `)` closing a
    /// `SELECT` that was never opened) is returned unchanged.
    #[must_use]
    pub fn format(&self, sql: &str) -> String {
        match Layout::new(sql, &self.options).run() {
            Ok(formatted) => formatted,
            Err(fault) => {
                debug!(fault = fault.0, "sql left unformatted");
                String::from(sql)
            }
        }
    }
}

/// Formats `sql` with the default layout.
#[must_use]
pub fn format_sql(sql: &str) -> String {
    SqlFormatter::new().format(sql)
}

/// Why the layout gave up.
#[derive(Debug)]
struct Fault(&'static str);

/// Per-call layout state.
#[allow(clippy::struct_excessive_bools)]
struct Layout<'a> {
    tokens: Tokenizer<'a>,
    options: &'a FormatOptions,
    result: String,

    begin_line: bool,
    after_begin_before_end: bool,
    after_by_or_set_or_from_or_select: bool,
    after_on: bool,
    after_between: bool,
    after_insert: bool,
    in_function: usize,
    parens_since_select: i64,
    indent: i64,

    paren_counts: Vec<i64>,
    after_by_or_from_or_selects: Vec<bool>,

    last_token: String,
    token: String,
    lc_token: String,
}

impl<'a> Layout<'a> {
    fn new(sql: &'a str, options: &'a FormatOptions) -> Self {
        Self {
            tokens: Tokenizer::new(sql, DELIMITERS, true),
            options,
            result: String::with_capacity(sql.len() * 2),
            begin_line: true,
            after_begin_before_end: false,
            after_by_or_set_or_from_or_select: false,
            after_on: false,
            after_between: false,
            after_insert: false,
            in_function: 0,
            parens_since_select: 0,
            indent: 1,
            paren_counts: Vec::new(),
            after_by_or_from_or_selects: Vec::new(),
            last_token: String::new(),
            token: String::new(),
            lc_token: String::new(),
        }
    }

    fn run(mut self) -> Result<String, Fault> {
        self.result.push_str(&self.options.initial);

        while let Some(next) = self.tokens.next_token() {
            let whitespace = next.is_whitespace();
            self.token = String::from(next.text);
            if next.text == "'" || next.text == "\"" {
                self.stitch_quoted(next.text);
            }
            self.lc_token = self.token.to_lowercase();

            let class = KeywordClass::of(&self.lc_token);
            let token = self.token.as_str();

            if self.after_by_or_set_or_from_or_select && token == "," {
                self.comma_after_by_or_from_or_select();
            } else if self.after_on && token == "," {
                self.comma_after_on();
            } else if token == "(" {
                self.open_paren();
            } else if token == ")" {
                self.close_paren()?;
            } else if class == Some(KeywordClass::Begin) {
                self.begin_new_clause();
            } else if class == Some(KeywordClass::End) {
                self.end_new_clause();
            } else if self.lc_token == "select" {
                self.select();
            } else if class == Some(KeywordClass::Dml) {
                self.update_or_insert_or_delete();
            } else if self.lc_token == "values" {
                self.values();
            } else if self.lc_token == "on" {
                self.on();
            } else if self.after_between && self.lc_token == "and" {
                self.misc();
                self.after_between = false;
            } else if class == Some(KeywordClass::Logical) {
                self.logical();
            } else if whitespace {
                self.white();
            } else {
                self.misc();
            }

            if !whitespace {
                self.last_token.clone_from(&self.lc_token);
            }
        }

        Ok(self.result)
    }

    /// Glues the tokens of a quoted literal or identifier into one.
    fn stitch_quoted(&mut self, quote: &str) {
        while let Some(part) = self.tokens.next_token() {
            self.token.push_str(part.text);
            if part.text == quote {
                break;
            }
        }
    }

    fn out(&mut self) {
        self.result.push_str(&self.token);
    }

    fn newline(&mut self) {
        self.result.push('\n');
        for _ in 0..self.indent.max(0) {
            self.result.push_str(&self.options.indent);
        }
        self.begin_line = true;
    }

    fn comma_after_on(&mut self) {
        self.out();
        self.indent -= 1;
        self.newline();
        self.after_on = false;
        self.after_by_or_set_or_from_or_select = true;
    }

    fn comma_after_by_or_from_or_select(&mut self) {
        self.out();
        self.newline();
    }

    fn logical(&mut self) {
        if self.lc_token == "end" {
            self.indent -= 1;
        }
        self.newline();
        self.out();
        self.begin_line = false;
    }

    fn on(&mut self) {
        self.indent += 1;
        self.after_on = true;
        self.newline();
        self.out();
        self.begin_line = false;
    }

    fn misc(&mut self) {
        self.out();
        if self.lc_token == "between" {
            self.after_between = true;
        }
        if self.after_insert {
            self.newline();
            self.after_insert = false;
        } else {
            self.begin_line = false;
            if self.lc_token == "case" {
                self.indent += 1;
            }
        }
    }

    fn white(&mut self) {
        if !self.begin_line {
            self.result.push(' ');
        }
    }

    fn update_or_insert_or_delete(&mut self) {
        self.out();
        self.indent += 1;
        self.begin_line = false;
        match self.lc_token.as_str() {
            "update" => self.newline(),
            "insert" => self.after_insert = true,
            _ => {}
        }
    }

    fn select(&mut self) {
        self.out();
        self.indent += 1;
        self.newline();
        self.paren_counts.push(self.parens_since_select);
        self.after_by_or_from_or_selects
            .push(self.after_by_or_set_or_from_or_select);
        self.parens_since_select = 0;
        self.after_by_or_set_or_from_or_select = true;
    }

    fn end_new_clause(&mut self) {
        if !self.after_begin_before_end {
            self.indent -= 1;
            if self.after_on {
                self.indent -= 1;
                self.after_on = false;
            }
            self.newline();
        }
        self.out();
        if self.lc_token != "union" {
            self.indent += 1;
        }
        self.newline();
        self.after_begin_before_end = false;
        self.after_by_or_set_or_from_or_select =
            matches!(self.lc_token.as_str(), "by" | "set" | "from");
    }

    fn begin_new_clause(&mut self) {
        if !self.after_begin_before_end {
            if self.after_on {
                self.indent -= 1;
                self.after_on = false;
            }
            self.indent -= 1;
            self.newline();
        }
        self.out();
        self.begin_line = false;
        self.after_begin_before_end = true;
    }

    fn values(&mut self) {
        self.indent -= 1;
        self.newline();
        self.out();
        self.indent += 1;
        self.newline();
    }

    fn close_paren(&mut self) -> Result<(), Fault> {
        self.parens_since_select -= 1;
        if self.parens_since_select < 0 {
            self.indent -= 1;
            let (Some(count), Some(flag)) = (
                self.paren_counts.pop(),
                self.after_by_or_from_or_selects.pop(),
            ) else {
                return Err(Fault("')' closes a scope that was never opened"));
            };
            self.parens_since_select = count;
            self.after_by_or_set_or_from_or_select = flag;
        }
        if self.in_function > 0 {
            self.in_function -= 1;
            self.out();
        } else {
            if !self.after_by_or_set_or_from_or_select {
                self.indent -= 1;
                self.newline();
            }
            self.out();
        }
        self.begin_line = false;
        Ok(())
    }

    fn open_paren(&mut self) {
        if is_function_name(&self.last_token) || self.in_function > 0 {
            self.in_function += 1;
        }
        self.begin_line = false;
        self.out();
        if self.in_function == 0 && !self.after_by_or_set_or_from_or_select {
            self.indent += 1;
            self.newline();
        }
        self.parens_since_select += 1;
    }
}
