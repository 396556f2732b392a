//! Named-parameter scanner.
//!
//! A single left-to-right pass that copies the input through unchanged except
//! for `:name` and `&name` markers, each of which becomes one `?`.

use std::collections::HashMap;

use super::query::{NamedParam, OutParam};
use super::{ParseError, Span};

/// Lexical context of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Default,
    SingleQuote,
    DoubleQuote,
    BlockComment,
}

/// Output of a scan.
#[derive(Debug)]
pub(crate) struct Scanned {
    pub(crate) sql: String,
    pub(crate) params: Vec<NamedParam>,
    pub(crate) out_params: Vec<OutParam>,
    pub(crate) marker_count: usize,
}

/// Rewrites named markers into positional placeholders.
pub(crate) struct Scanner<'a> {
    /// The input query text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    state: ScanState,
    /// Last ordinal handed out; shared by all names.
    ordinal: usize,
    sql: String,
    params: Vec<NamedParam>,
    /// Upper-cased name to index into `params`.
    index: HashMap<String, usize>,
    out_params: Vec<OutParam>,
}

/// Returns true if `c` can start a marker name.
pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Returns true if `c` can continue a marker name.
pub(crate) fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `input`.
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: ScanState::Default,
            ordinal: 0,
            sql: String::with_capacity(input.len()),
            params: Vec::new(),
            index: HashMap::new(),
            out_params: Vec::new(),
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the character after the current one.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Copies the current character to the output.
    fn copy(&mut self) {
        if let Some(c) = self.advance() {
            self.sql.push(c);
        }
    }

    /// Runs the scan to completion.
    pub(crate) fn scan(mut self) -> Result<Scanned, ParseError> {
        while let Some(c) = self.peek() {
            match self.state {
                ScanState::Default => match c {
                    '\'' => {
                        self.copy();
                        self.state = ScanState::SingleQuote;
                    }
                    '"' => {
                        self.copy();
                        self.state = ScanState::DoubleQuote;
                    }
                    '/' if self.peek_next() == Some('*') => {
                        self.copy();
                        self.copy();
                        self.state = ScanState::BlockComment;
                    }
                    // PostgreSQL cast, never a marker.
                    ':' if self.peek_next() == Some(':') => {
                        self.copy();
                        self.copy();
                    }
                    ':' | '&' if self.peek_next().is_some_and(is_identifier_start) => {
                        self.scan_marker(c)?;
                    }
                    _ => self.copy(),
                },
                ScanState::SingleQuote => {
                    self.copy();
                    if c == '\'' {
                        self.state = ScanState::Default;
                    }
                }
                ScanState::DoubleQuote => {
                    self.copy();
                    if c == '"' {
                        self.state = ScanState::Default;
                    }
                }
                ScanState::BlockComment => {
                    if c == '*' && self.peek_next() == Some('/') {
                        self.copy();
                        self.copy();
                        self.state = ScanState::Default;
                    } else {
                        self.copy();
                    }
                }
            }
        }

        Ok(Scanned {
            sql: self.sql,
            params: self.params,
            out_params: self.out_params,
            marker_count: self.ordinal,
        })
    }

    /// Consumes one marker and emits its placeholder.
    fn scan_marker(&mut self, sigil: char) -> Result<(), ParseError> {
        let start = self.pos;
        self.advance(); // sigil
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }
        let span = Span::new(start, self.pos);
        let name = self.input[start + sigil.len_utf8()..self.pos].to_uppercase();

        self.ordinal += 1;
        let ordinal = self.ordinal;
        self.sql.push('?');

        if sigil == '&' {
            if self.out_params.iter().any(|out| out.name == name) {
                return Err(ParseError::duplicate_output(name, span, self.input));
            }
            self.out_params.push(OutParam {
                name: name.clone(),
                position: ordinal,
            });
        }

        match self.index.get(&name) {
            Some(&i) => self.params[i].positions.push(ordinal),
            None => {
                self.index.insert(name.clone(), self.params.len());
                self.params.push(NamedParam {
                    name,
                    positions: vec![ordinal],
                });
            }
        }
        Ok(())
    }
}

/// Produces the diagnostic form of `sql`.
///
/// Block comments are removed, whitespace runs outside quotes collapse to a
/// single space and the result is trimmed. Nested block comments end at the
/// first `*/`.
#[must_use]
pub fn clean_text(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut state = ScanState::Default;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Default => match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = ScanState::BlockComment;
                }
                c if c.is_whitespace() => {
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
                '\'' => {
                    out.push(c);
                    state = ScanState::SingleQuote;
                }
                '"' => {
                    out.push(c);
                    state = ScanState::DoubleQuote;
                }
                _ => out.push(c),
            },
            ScanState::SingleQuote => {
                out.push(c);
                if c == '\'' {
                    state = ScanState::Default;
                }
            }
            ScanState::DoubleQuote => {
                out.push(c);
                if c == '"' {
                    state = ScanState::Default;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = ScanState::Default;
                    // Keep the tokens on either side of the comment apart.
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
            }
        }
    }

    out.trim().to_string()
}
