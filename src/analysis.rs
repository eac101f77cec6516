//! One entry point per provider pass
//!
//! Every call parses the text it is given from scratch; nothing is cached
//! between calls.

use crate::ast::Node;
use crate::color::Rgba;
use crate::completion::{complete, CompletionItem};
use crate::config::LensConfig;
use crate::decorations::{document_decorations, Decoration};
use crate::normalize::{document_colors, ColorInformation};
use crate::parser::{IndentParser, ParseError, StylusParser};
use crate::presentation::color_presentations;
use crate::schema::{CssSchema, SchemaError};
use crate::symbols::{document_symbols, Symbol};
use std::borrow::Cow;

pub struct Analyzer<P = IndentParser> {
    parser: P,
    config: LensConfig,
    schema: Cow<'static, CssSchema>,
}

impl Default for Analyzer<IndentParser> {
    fn default() -> Self {
        Self { parser: IndentParser, config: LensConfig::default(), schema: Cow::Borrowed(CssSchema::bundled()) }
    }
}

impl Analyzer<IndentParser> {
    pub fn from_config(config: LensConfig) -> Result<Self, SchemaError> {
        Self::with_parser(IndentParser, config)
    }
}

impl<P: StylusParser> Analyzer<P> {
    /// Analyzer over a custom parser; loads the configured schema file, if any.
    pub fn with_parser(parser: P, config: LensConfig) -> Result<Self, SchemaError> {
        let schema = match &config.completion.schema {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading CSS schema");
                Cow::Owned(CssSchema::load(path)?)
            }
            None => Cow::Borrowed(CssSchema::bundled()),
        };
        Ok(Self { parser, config, schema })
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn schema(&self) -> &CssSchema {
        &self.schema
    }

    /// Tree exactly as the parser returns it, errors included.
    pub fn ast(&self, text: &str) -> Result<Node, ParseError> {
        self.parser.parse(text)
    }

    pub fn symbols(&self, text: &str) -> Vec<Symbol> {
        if !self.config.symbols.enabled {
            return Vec::new();
        }
        document_symbols(&self.parser, text)
    }

    pub fn colors(&self, text: &str) -> Vec<ColorInformation> {
        if !self.config.colors.enabled {
            return Vec::new();
        }
        document_colors(&self.parser, text)
    }

    pub fn decorations(&self, text: &str) -> Vec<Decoration> {
        if !self.config.colors.decorations {
            return Vec::new();
        }
        document_decorations(&self.parser, text, self.config.colors.max_decorations)
    }

    /// Completions for `current_word`, the text between the line start and
    /// the cursor.
    pub fn completions(&self, text: &str, current_word: &str) -> Vec<CompletionItem> {
        if !self.config.completion.enabled {
            return Vec::new();
        }
        complete(&self.parser, text, current_word, &self.schema, self.config.completion.use_separator)
    }

    pub fn presentations(&self, color: &Rgba) -> Vec<String> {
        color_presentations(color)
    }

    /// Color of a single value written as it would be in a stylesheet,
    /// independent of the `colors.enabled` setting.
    pub fn parse_color(&self, value: &str) -> Option<Rgba> {
        let text = format!("$color = {}", value.trim());
        document_colors(&self.parser, &text).first().map(|info| info.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JsonTree;
    use std::path::PathBuf;

    const SAMPLE: &str = "$primary = #336699\n.button\n  color $primary\n  background red";

    #[test]
    fn test_default_passes() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.symbols(SAMPLE).len(), 2);
        assert_eq!(analyzer.colors(SAMPLE).len(), 2);
        assert_eq!(analyzer.decorations(SAMPLE).len(), 2);
        assert!(!analyzer.completions(SAMPLE, "  co").is_empty());
    }

    #[test]
    fn test_disabled_features_return_nothing() {
        let mut config = LensConfig::default();
        config.symbols.enabled = false;
        config.colors.enabled = false;
        config.colors.decorations = false;
        config.completion.enabled = false;
        let analyzer = Analyzer::from_config(config).unwrap();
        assert!(analyzer.symbols(SAMPLE).is_empty());
        assert!(analyzer.colors(SAMPLE).is_empty());
        assert!(analyzer.decorations(SAMPLE).is_empty());
        assert!(analyzer.completions(SAMPLE, "").is_empty());
    }

    #[test]
    fn test_decoration_cap_from_config() {
        let mut config = LensConfig::default();
        config.colors.max_decorations = 1;
        let analyzer = Analyzer::from_config(config).unwrap();
        assert_eq!(analyzer.decorations(SAMPLE).len(), 1);
    }

    #[test]
    fn test_parse_color() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.parse_color("teal"), Some(Rgba::new(0.0, 128.0, 128.0, 1.0)));
        assert_eq!(analyzer.parse_color(" #336699 "), Some(Rgba::new(51.0, 102.0, 153.0, 1.0)));
        assert_eq!(analyzer.parse_color("10px"), None);
    }

    #[test]
    fn test_missing_schema_file_is_an_error() {
        let mut config = LensConfig::default();
        config.completion.schema = Some(PathBuf::from("/nonexistent/schema.json"));
        assert!(Analyzer::from_config(config).is_err());
    }

    #[test]
    fn test_custom_schema_replaces_bundled() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{ "properties": [{ "name": "gap" }] }"#).unwrap();

        let mut config = LensConfig::default();
        config.completion.schema = Some(path);
        let analyzer = Analyzer::from_config(config).unwrap();
        let labels: Vec<String> = analyzer.completions("", "  g").into_iter().map(|item| item.label).collect();
        assert_eq!(labels, vec!["gap"]);
    }

    #[test]
    fn test_external_parser_tree() {
        let json = r#"{
            "nodeName": "root",
            "nodes": [{ "nodeName": "ident", "name": "$x", "lineno": 1, "column": 1,
                        "val": { "nodeName": "expression", "lineno": 1, "column": 6, "nodes": [] } }]
        }"#;
        let analyzer = Analyzer::with_parser(JsonTree::from_json(json).unwrap(), LensConfig::default()).unwrap();
        let symbols = analyzer.symbols("$x = 1");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "$x");
    }
}
