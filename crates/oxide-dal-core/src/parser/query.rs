//! The immutable result of parsing query text.

use super::scanner::{clean_text, Scanner};
use super::ParseError;
use crate::driver::StatementKind;

/// Prefixes of the clean text that route a statement through the callable path.
const CALLABLE_PREFIXES: [&str; 3] = ["{call", "begin", "declare"];

/// A named input marker and every ordinal it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParam {
    /// Upper-cased marker name.
    pub name: String,
    /// 1-based ordinals in order of appearance.
    pub positions: Vec<usize>,
}

/// A `&name` output marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutParam {
    /// Upper-cased marker name.
    pub name: String,
    /// 1-based ordinal.
    pub position: usize,
}

/// Parsed query text.
///
/// Built once by [`Query::parse`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    original: String,
    sql: String,
    clean: String,
    params: Vec<NamedParam>,
    out_params: Vec<OutParam>,
    marker_count: usize,
    kind: StatementKind,
}

impl Query {
    /// Parses `text`, replacing every `:name` and `&name` marker with `?`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if an output marker name is declared twice.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let scanned = Scanner::new(text).scan()?;
        let clean = clean_text(text);
        let kind = if is_callable(&clean) {
            StatementKind::Callable
        } else {
            StatementKind::Prepared
        };

        Ok(Self {
            original: text.to_string(),
            sql: scanned.sql,
            clean,
            params: scanned.params,
            out_params: scanned.out_params,
            marker_count: scanned.marker_count,
            kind,
        })
    }

    /// Returns the text as written by the caller.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns the positional text sent to the driver.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the comment-free, whitespace-collapsed text.
    #[must_use]
    pub fn clean(&self) -> &str {
        &self.clean
    }

    /// Returns every named marker in order of first appearance.
    #[must_use]
    pub fn params(&self) -> &[NamedParam] {
        &self.params
    }

    /// Returns the marker names in order of first appearance.
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Returns the ordinals of `name`, or an empty slice if it does not occur.
    #[must_use]
    pub fn positions(&self, name: &str) -> &[usize] {
        let name = name.to_uppercase();
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.positions.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the output markers. Empty unless the query is callable.
    #[must_use]
    pub fn out_params(&self) -> &[OutParam] {
        if self.is_callable() {
            &self.out_params
        } else {
            &[]
        }
    }

    /// Returns the output marker names. Empty unless the query is callable.
    #[must_use]
    pub fn out_param_names(&self) -> Vec<&str> {
        self.out_params().iter().map(|p| p.name.as_str()).collect()
    }

    /// Returns the ordinal of output marker `name`.
    #[must_use]
    pub fn out_position(&self, name: &str) -> Option<usize> {
        let name = name.to_uppercase();
        self.out_params()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.position)
    }

    /// Returns the total number of `?` placeholders.
    #[must_use]
    pub const fn marker_count(&self) -> usize {
        self.marker_count
    }

    /// Returns how the statement is routed through the driver.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns true for stored-procedure calls and anonymous blocks.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.kind == StatementKind::Callable
    }
}

fn is_callable(clean: &str) -> bool {
    let text = clean.trim_start();
    CALLABLE_PREFIXES.iter().any(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callable_detection() {
        assert!(is_callable("{call p(?)}"));
        assert!(is_callable("{CALL p(?)}"));
        assert!(is_callable("BEGIN p(?); END;"));
        assert!(is_callable("declare x number; begin null; end;"));
        assert!(!is_callable("SELECT 1"));
        assert!(!is_callable("{ call p }"));
        assert!(!is_callable("be"));
    }

    #[test]
    fn test_callable_after_comment() {
        let query = Query::parse("/* header */\n  begin :x := 1; end;").unwrap();
        assert!(query.is_callable());
        assert_eq!(query.clean(), "begin :x := 1; end;");
    }

    #[test]
    fn test_positions_case_insensitive() {
        let query = Query::parse("UPDATE t SET a = :Val WHERE b = :val").unwrap();
        assert_eq!(query.positions("VAL"), &[1, 2]);
        assert_eq!(query.positions("val"), &[1, 2]);
        assert!(query.positions("missing").is_empty());
    }

    #[test]
    fn test_out_params_hidden_when_not_callable() {
        let query = Query::parse("SELECT &x FROM dual").unwrap();
        assert!(!query.is_callable());
        assert!(query.out_param_names().is_empty());
        assert_eq!(query.param_names(), vec!["X"]);
    }

    #[test]
    fn test_original_is_kept() {
        let text = "SELECT :a /* c */";
        let query = Query::parse(text).unwrap();
        assert_eq!(query.original(), text);
        assert_eq!(query.sql(), "SELECT ? /* c */");
        assert_eq!(query.clean(), "SELECT :a");
    }
}
