// src/pipeline/diagnostics.rs

//! Turning tool output into structured diagnostics.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `path/to/file.css:12:5: message` (unix / gcc style).
static FILE_LINE_COL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+):?\s*(?P<msg>.+)$")
        .expect("static regex")
});

/// `  12:5  error  message` (stylish style, file printed on a previous line).
static LINE_COL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<line>\d+):(?P<col>\d+)\s+(?P<msg>.+)$").expect("static regex")
});

/// One finding reported by a validator, linter or compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
        }
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "{line}:{col}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// Parse every non-blank line of `text` into a [`Diagnostic`].
///
/// Lines in a recognised position format get `line`/`column`; anything else
/// is kept verbatim as the message.
pub fn parse_diagnostics(text: &str) -> Vec<Diagnostic> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Diagnostic {
    if let Some(caps) = FILE_LINE_COL.captures(line) {
        return Diagnostic {
            file: Some(caps["file"].to_string()),
            line: caps["line"].parse().ok(),
            column: caps["col"].parse().ok(),
            message: caps["msg"].trim().to_string(),
        };
    }
    if let Some(caps) = LINE_COL.captures(line) {
        return Diagnostic {
            file: None,
            line: caps["line"].parse().ok(),
            column: caps["col"].parse().ok(),
            message: caps["msg"].trim().to_string(),
        };
    }
    Diagnostic {
        file: None,
        line: None,
        column: None,
        message: line.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_format_is_structured() {
        let d = parse_diagnostics("<input css 1>:3:7: Unexpected empty block (block-no-empty) [error]\n");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].file.as_deref(), Some("<input css 1>"));
        assert_eq!(d[0].line, Some(3));
        assert_eq!(d[0].column, Some(7));
        assert!(d[0].message.starts_with("Unexpected empty block"));
    }

    #[test]
    fn stylish_lines_and_free_text_are_kept() {
        let text = "index.js\n  4:10  error  'x' is not defined  no-undef\n\n1 problem\n";
        let d = parse_diagnostics(text);
        assert_eq!(d.len(), 3);
        assert_eq!(d[0].message, "index.js");
        assert_eq!((d[1].line, d[1].column), (Some(4), Some(10)));
        assert_eq!(d[2].to_string(), "1 problem");
    }
}
