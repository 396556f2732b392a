//! Parser error types.

use core::fmt;

use super::Span;

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The same `&name` output marker appears twice.
    DuplicateOutput {
        /// Upper-cased marker name.
        name: String,
    },
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The error message.
    pub message: String,
    /// The location of the offending marker.
    pub span: Span,
    /// The query text that failed.
    pub query: String,
}

impl ParseError {
    /// Creates a "duplicate output parameter" error.
    #[must_use]
    pub fn duplicate_output(name: impl Into<String>, span: Span, query: &str) -> Self {
        let name = name.into();
        Self {
            message: format!("output parameter &{name} is declared more than once"),
            kind: ParseErrorKind::DuplicateOutput { name },
            span,
            query: query.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}..{} in: {}",
            self.message, self.span.start, self.span.end, self.query
        )
    }
}

impl std::error::Error for ParseError {}
