//! Completion items for the text before the cursor
//!
//! Keyword completions come from the CSS schema; symbol completions come
//! from the document itself through the completion variant of the
//! flattener. Filtering by prefix is left to the editor.

use crate::document::Document;
use crate::flatten::completion_candidates;
use crate::parser::{build_ast, StylusParser};
use crate::schema::CssSchema;
use crate::symbols::{build_symbols, dedupe_symbols, Symbol, SymbolKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Variable,
    Function,
    Class,
    Property,
    Value,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
}

/// Helper to create completion items
fn make_completion(label: &str, kind: CompletionKind, detail: Option<&str>, insert: Option<String>) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind,
        detail: detail.map(str::to_string),
        documentation: None,
        insert_text: insert,
    }
}

pub fn is_class_or_id(current_word: &str) -> bool {
    current_word.starts_with('.') || current_word.starts_with('#')
}

pub fn is_at_rule(current_word: &str) -> bool {
    current_word.starts_with('@')
}

/// Property named at the start of the line: `"  color: re"` gives `color`.
pub fn property_name(current_word: &str) -> &str {
    let trimmed = current_word.trim();
    let end = trimmed.find([':', ' ']).unwrap_or(trimmed.len());
    &trimmed[..end]
}

/// The cursor follows a known property, so values are wanted.
pub fn is_value_context(schema: &CssSchema, current_word: &str) -> bool {
    let property = property_name(current_word);
    !property.is_empty() && schema.property(property).is_some()
}

pub fn at_rule_completions(schema: &CssSchema, current_word: &str) -> Vec<CompletionItem> {
    if !is_at_rule(current_word) {
        return Vec::new();
    }
    schema
        .at_directives
        .iter()
        .map(|directive| {
            let insert = directive.name.strip_prefix('@').unwrap_or(&directive.name).to_string();
            make_completion(&directive.name, CompletionKind::Keyword, directive.desc.as_deref(), Some(insert))
        })
        .collect()
}

pub fn property_completions(schema: &CssSchema, current_word: &str, use_separator: bool) -> Vec<CompletionItem> {
    if is_class_or_id(current_word) || is_at_rule(current_word) {
        return Vec::new();
    }
    let separator = if use_separator { ": " } else { " " };
    schema
        .properties
        .iter()
        .map(|property| {
            let insert = format!("{}{}", property.name, separator);
            let mut item =
                make_completion(&property.name, CompletionKind::Property, property.desc.as_deref(), Some(insert));
            item.documentation = property.description();
            item
        })
        .collect()
}

pub fn value_completions(schema: &CssSchema, current_word: &str) -> Vec<CompletionItem> {
    let Some(property) = schema.property(property_name(current_word)) else {
        return Vec::new();
    };
    property
        .values
        .iter()
        .map(|value| make_completion(&value.name, CompletionKind::Value, value.desc.as_deref(), None))
        .collect()
}

fn symbol_item(symbol: Symbol, document: &Document<'_>) -> CompletionItem {
    match symbol.kind {
        SymbolKind::Variable => {
            let detail = document.line(symbol.range.start.line).trim();
            make_completion(&symbol.name, CompletionKind::Variable, Some(detail), None)
        }
        SymbolKind::Function => make_completion(&symbol.name, CompletionKind::Function, None, None),
        SymbolKind::Class | SymbolKind::Namespace => make_completion(&symbol.name, CompletionKind::Class, None, None),
    }
}

/// Variables, functions and selectors declared in the document.
pub fn symbol_completions(parser: &dyn StylusParser, text: &str) -> Vec<CompletionItem> {
    let document = Document::new(text);
    let tree = build_ast(parser, text);
    let symbols = dedupe_symbols(build_symbols(completion_candidates(&tree), &document));
    symbols.into_iter().map(|symbol| symbol_item(symbol, &document)).collect()
}

/// All completions for the text between the line start and the cursor.
pub fn complete(
    parser: &dyn StylusParser,
    text: &str,
    current_word: &str,
    schema: &CssSchema,
    use_separator: bool,
) -> Vec<CompletionItem> {
    let symbols = symbol_completions(parser, text);

    if is_value_context(schema, current_word) {
        let mut items = value_completions(schema, current_word);
        items.extend(symbols.into_iter().filter(|item| item.kind == CompletionKind::Variable));
        return items;
    }

    let mut items = at_rule_completions(schema, current_word);
    items.extend(property_completions(schema, current_word, use_separator));
    items.extend(symbols);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::IndentParser;

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("  color: re"), "color");
        assert_eq!(property_name("\tbackground rgba"), "background");
        assert_eq!(property_name("   "), "");
    }

    #[test]
    fn test_value_context() {
        let schema = CssSchema::bundled();
        assert!(is_value_context(schema, "  display "));
        assert!(!is_value_context(schema, "  disp"));
        assert!(!is_value_context(schema, ""));
    }

    #[test]
    fn test_at_rules_only_after_at() {
        let schema = CssSchema::bundled();
        let items = at_rule_completions(schema, "@me");
        let media = items.iter().find(|item| item.label == "@media").unwrap();
        assert_eq!(media.insert_text.as_deref(), Some("media"));
        assert_eq!(media.kind, CompletionKind::Keyword);
        assert!(at_rule_completions(schema, "  me").is_empty());
    }

    #[test]
    fn test_properties_respect_separator_setting() {
        let schema = CssSchema::bundled();
        let with = property_completions(schema, "  co", true);
        let color = with.iter().find(|item| item.label == "color").unwrap();
        assert_eq!(color.insert_text.as_deref(), Some("color: "));
        assert!(color.documentation.as_deref().unwrap().contains("Syntax: <color>"));

        let without = property_completions(schema, "  co", false);
        let color = without.iter().find(|item| item.label == "color").unwrap();
        assert_eq!(color.insert_text.as_deref(), Some("color "));
    }

    #[test]
    fn test_no_properties_after_selector_prefix() {
        let schema = CssSchema::bundled();
        assert!(property_completions(schema, ".btn", true).is_empty());
        assert!(property_completions(schema, "#main", true).is_empty());
    }

    #[test]
    fn test_symbol_completions() {
        let text = "$gutter = 10px\nmixin()\n  color red\n.card\n  padding $gutter\n@media print\n  .x\n    color red";
        let items = symbol_completions(&IndentParser, text);
        assert_eq!(labels(&items), vec!["$gutter", "mixin", ".card", ".x"]);
        assert_eq!(items[0].detail.as_deref(), Some("$gutter = 10px"));
        assert_eq!(items[1].kind, CompletionKind::Function);
        assert_eq!(items[2].kind, CompletionKind::Class);
    }

    #[test]
    fn test_value_context_offers_values_and_variables() {
        let text = "$shown = block\n.a\n  display $shown";
        let items = complete(&IndentParser, text, "  display ", CssSchema::bundled(), true);
        assert!(labels(&items).contains(&"flex"));
        assert!(labels(&items).contains(&"$shown"));
        assert!(items.iter().all(|item| matches!(item.kind, CompletionKind::Value | CompletionKind::Variable)));
    }

    #[test]
    fn test_statement_context_offers_properties_and_symbols() {
        let items = complete(&IndentParser, "$a = 1\n.b\n  wi", "  wi", CssSchema::bundled(), true);
        assert!(labels(&items).contains(&"width"));
        assert!(labels(&items).contains(&"$a"));
        assert!(labels(&items).contains(&".b"));
        assert!(items.iter().all(|item| item.kind != CompletionKind::Keyword));
    }

    #[test]
    fn test_unparseable_text_still_offers_keywords() {
        let items = complete(&IndentParser, "$a = (", "  wi", CssSchema::bundled(), true);
        assert!(!items.is_empty());
        assert!(items.iter().all(|item| item.kind == CompletionKind::Property));
    }
}
