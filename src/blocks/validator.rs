//! Syntax validation for configuration block content.
//!
//! # Responsibilities
//! - Tokenize nginx-style configuration text
//! - Check directive termination and brace balance
//! - Report every syntax error with its line, not just the first
//!
//! # Design Decisions
//! - Validation is a pure function of the text; no file includes are resolved
//! - Lenient mode discards errors, strict mode returns them all

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Options controlling how syntax errors are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Accept content even when it contains syntax errors.
    pub ignore_syntax_errors: bool,
}

impl ExpandOptions {
    /// Syntax errors are reported.
    pub const STRICT: Self = Self {
        ignore_syntax_errors: false,
    };
}

/// A single syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line where the error was detected.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// All syntax errors found in a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_errors(.0))]
pub struct SyntaxErrors(pub Vec<SyntaxError>);

fn render_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks block content before it is accepted.
pub trait SyntaxValidator: Send + Sync {
    fn check(&self, content: &str, options: ExpandOptions) -> Result<(), SyntaxErrors>;
}

/// Validator for nginx configuration snippets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NginxSyntaxValidator;

impl SyntaxValidator for NginxSyntaxValidator {
    fn check(&self, content: &str, options: ExpandOptions) -> Result<(), SyntaxErrors> {
        let errors = Parser::new(content).run();
        if errors.is_empty() || options.ignore_syntax_errors {
            return Ok(());
        }
        Err(SyntaxErrors(errors))
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    /// Words of the directive being read, with the line of the first one.
    pending: Option<(usize, String)>,
    /// Lines of the currently open blocks.
    open_blocks: Vec<usize>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            chars: content.chars().peekable(),
            line: 1,
            pending: None,
            open_blocks: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<SyntaxError> {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.chars.next();
                    self.line += 1;
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '#' => self.skip_comment(),
                ';' => {
                    self.chars.next();
                    if self.pending.take().is_none() {
                        self.error(self.line, "unexpected \";\"");
                    }
                }
                '{' => {
                    self.chars.next();
                    if self.pending.take().is_none() {
                        self.error(self.line, "unexpected \"{\"");
                    }
                    self.open_blocks.push(self.line);
                }
                '}' => {
                    self.chars.next();
                    if let Some((line, name)) = self.pending.take() {
                        self.error(line, format!("directive \"{}\" is not terminated by \";\"", name));
                    }
                    if self.open_blocks.pop().is_none() {
                        self.error(self.line, "unexpected \"}\"");
                    }
                }
                '"' | '\'' => {
                    let start = self.line;
                    match self.read_quoted() {
                        Some(word) => self.push_word(start, word),
                        None => self.error(start, "unterminated quoted string"),
                    }
                }
                _ => {
                    let start = self.line;
                    let word = self.read_word();
                    self.push_word(start, word);
                }
            }
        }

        if let Some((line, name)) = self.pending.take() {
            self.error(
                line,
                format!("unexpected end of file, directive \"{}\" expects \";\" or \"{{\"", name),
            );
        }
        for line in std::mem::take(&mut self.open_blocks) {
            self.error(line, "unexpected end of file, block opened here is missing \"}\"");
        }
        self.errors
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(SyntaxError {
            line,
            message: message.into(),
        });
    }

    fn push_word(&mut self, line: usize, word: String) {
        if self.pending.is_none() {
            self.pending = Some((line, word));
        }
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    /// Reads a quoted string; `None` when the input ends before the closing quote.
    fn read_quoted(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut word = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = self.chars.next() {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        word.push(escaped);
                    }
                }
                '\n' => {
                    self.line += 1;
                    word.push(c);
                }
                c if c == quote => return Some(word),
                c => word.push(c),
            }
        }
        None
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, ';' | '{' | '}' | '"' | '\'') {
                break;
            }
            self.chars.next();
            word.push(c);
            if c == '$' && self.chars.peek() == Some(&'{') {
                self.read_variable(&mut word);
            }
        }
        word
    }

    /// Appends a `${name}` variable to `word`. The variable can't span a line
    /// or swallow a `;`/`{`, so an unclosed one ends there and scanning goes on.
    fn read_variable(&mut self, word: &mut String) {
        let start = self.line;
        if let Some(open) = self.chars.next() {
            word.push(open);
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, ';' | '{') {
                break;
            }
            self.chars.next();
            word.push(c);
            if c == '}' {
                return;
            }
        }
        self.error(start, "the closing bracket in variable is missing");
    }
}
