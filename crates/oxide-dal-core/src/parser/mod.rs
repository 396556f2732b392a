//! Named-parameter parser.
//!
//! Rewrites `:name` (input) and `&name` (output) markers into positional `?`
//! placeholders and records where each name landed. Markers are recognized
//! only outside quotes and `/* */` comments. Nested block comments are not
//! supported: a comment ends at the first `*/`.

mod error;
mod query;
mod scanner;
mod span;

pub use error::{ParseError, ParseErrorKind};
pub use query::{NamedParam, OutParam, Query};
pub use scanner::clean_text;
pub use span::Span;

/// Parses `text` into a [`Query`].
///
/// # Errors
///
/// Returns a [`ParseError`] if an output marker name is declared twice.
pub fn parse(text: &str) -> Result<Query, ParseError> {
    Query::parse(text)
}
