//! Multi-statement scripts.
//!
//! Statements in a script are separated by a line that contains only `/`,
//! optionally padded with spaces or tabs.

use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*/[ \t]*\r?$").expect("Invalid script separator regex")
});

/// Splits `script` into statements, in source order.
///
/// Fragments that are empty or whitespace-only are dropped, so a trailing
/// separator does not produce an extra statement.
#[must_use]
pub fn split_script(script: &str) -> Vec<&str> {
    SEPARATOR
        .split(script)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_statements() {
        let script = "INSERT INTO t VALUES (1)\n/\nINSERT INTO t VALUES (2)\n  /  \nDELETE FROM t\n";
        assert_eq!(
            split_script(script),
            vec![
                "INSERT INTO t VALUES (1)",
                "INSERT INTO t VALUES (2)",
                "DELETE FROM t",
            ]
        );
    }

    #[test]
    fn test_trailing_separator_and_blank_fragments() {
        let script = "\n/\nBEGIN p; END;\n/\n\n/\n";
        assert_eq!(split_script(script), vec!["BEGIN p; END;"]);
    }

    #[test]
    fn test_slash_inside_line_is_not_separator() {
        let script = "SELECT 4 / 2 FROM dual\n/\nSELECT 1 FROM dual";
        assert_eq!(
            split_script(script),
            vec!["SELECT 4 / 2 FROM dual", "SELECT 1 FROM dual"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let script = "SELECT 1\r\n/\r\nSELECT 2\r\n";
        assert_eq!(split_script(script), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_no_separator() {
        assert_eq!(split_script("  SELECT 1  "), vec!["SELECT 1"]);
        assert!(split_script("   \n  ").is_empty());
    }
}
