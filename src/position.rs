//! Position recovery from raw document lines
//!
//! The parser's columns are unreliable for most node kinds, so positions are
//! recovered by locating the node's text on its reported line. Lines are
//! 0-based, columns are byte offsets into the line. A name that cannot be
//! found resolves to column 0 rather than failing.

use serde::{Deserialize, Serialize};

/// A position in a document (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A range in a document, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Single-line span starting at `column` and covering `len` bytes.
    pub fn on_line(line: usize, column: usize, len: usize) -> Self {
        Self { start: Position::new(line, column), end: Position::new(line, column + len) }
    }
}

/// Convert a parser line number (1-based) to a document line index.
pub fn line_index(lineno: usize) -> usize {
    lineno.saturating_sub(1)
}

/// Strip interpolation braces and surrounding whitespace from a name.
pub fn prepare_name(name: &str) -> String {
    name.replace(['{', '}'], "").trim().to_string()
}

/// Column of the first occurrence of `search` in `line`, or 0.
pub fn find_column(search: &str, line: &str) -> usize {
    line.find(search).unwrap_or(0)
}

/// Column of the first occurrence of `search` at or after `hint`.
///
/// Falls back to [`find_column`] when nothing matches past the hint.
pub fn find_column_from(search: &str, line: &str, hint: usize) -> usize {
    line.get(hint..)
        .and_then(|rest| rest.find(search))
        .map(|offset| hint + offset)
        .unwrap_or_else(|| find_column(search, line))
}

/// End column (exclusive) of the first `)` at or after `from`.
pub fn closing_paren_column(line: &str, from: usize) -> Option<usize> {
    line.get(from..).and_then(|rest| rest.find(')')).map(|offset| from + offset + 1)
}
