//! stylus-lens - editor intelligence for Stylus stylesheets
//!
//! This library provides functionality to:
//! - Parse Stylus sources into a typed tree (or load a tree produced elsewhere)
//! - Flatten the tree into outline symbols with recovered source positions
//! - Find color values, evaluate their channels and render them back as CSS
//! - Offer property, value, at-rule and symbol completions
//!
//! Every pass re-parses the text it is given; see [`analysis::Analyzer`].

pub mod analysis;
pub mod ast;
pub mod classify;
pub mod cli;
pub mod color;
pub mod completion;
pub mod config;
pub mod decorations;
pub mod document;
pub mod extract;
pub mod flatten;
pub mod logging;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod named_colors;
pub mod normalize;
pub mod parser;
pub mod position;
pub mod presentation;
pub mod schema;
pub mod symbols;
pub mod watch;

pub use analysis::Analyzer;
pub use parser::{IndentParser, ParseError, StylusParser};
