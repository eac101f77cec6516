//! Document text accessor
//!
//! Every provider pass works on an immutable snapshot of the document text.

/// Snapshot of a document's text split into lines.
///
/// Lines are split on `\n`; a trailing `\r` is dropped so that column
/// arithmetic matches the parser's line numbering for CRLF files.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)).collect();
        Self { text, lines }
    }

    /// Full document text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Line at a 0-based index, or `""` past the end of the document.
    pub fn line(&self, index: usize) -> &'a str {
        self.lines.get(index).copied().unwrap_or("")
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_and_normalizes_crlf() {
        let doc = Document::new("a\r\nb\nc");
        assert_eq!(doc.lines(), &["a", "b", "c"]);
        assert_eq!(doc.line_count(), 3);
    }

    #[test]
    fn test_line_past_end_is_empty() {
        let doc = Document::new("only");
        assert_eq!(doc.line(0), "only");
        assert_eq!(doc.line(7), "");
    }

    #[test]
    fn test_trailing_newline_keeps_empty_last_line() {
        let doc = Document::new("a\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(1), "");
    }
}
