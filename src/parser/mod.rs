//! Parser boundary
//!
//! The core consumes the parse tree through [`StylusParser`]. Failures never
//! cross [`build_ast`]: a document that does not parse yields an empty tree,
//! so every feature degrades to "nothing found".

mod expr;
pub mod lexer;
mod statements;

use crate::ast::Node;
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// 1-based line number where the error occurred
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self { message: message.into(), line, column }
    }
}

/// Source text to parse tree.
pub trait StylusParser {
    fn parse(&self, text: &str) -> Result<Node, ParseError>;
}

/// Bundled parser for the indentation based Stylus syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentParser;

impl StylusParser for IndentParser {
    fn parse(&self, text: &str) -> Result<Node, ParseError> {
        statements::parse_document(text)
    }
}

/// Reads a tree dumped as JSON by another parser, ignoring the text.
#[derive(Debug, Clone)]
pub struct JsonTree {
    tree: Node,
}

impl JsonTree {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self { tree: serde_json::from_str(json)? })
    }
}

impl StylusParser for JsonTree {
    fn parse(&self, _text: &str) -> Result<Node, ParseError> {
        Ok(self.tree.clone())
    }
}

/// Parse `text`, substituting an empty `root` when parsing fails.
pub fn build_ast(parser: &dyn StylusParser, text: &str) -> Node {
    match parser.parse(text) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!(line = err.line, column = err.column, "parse failed: {}", err.message);
            Node::empty_root()
        }
    }
}
