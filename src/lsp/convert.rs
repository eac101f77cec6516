//! Conversions between analyzer output and protocol types.
//!
//! Analyzer columns are byte offsets; the protocol counts UTF-16 code units.

use crate::completion::{CompletionItem as LensCompletion, CompletionKind};
use crate::decorations::Decoration;
use crate::document::Document;
use crate::normalize::ColorInformation as LensColor;
use crate::position::{Position as LensPosition, Span};
use crate::symbols::{Symbol, SymbolKind as LensSymbolKind};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{
    Color, ColorInformation, CompletionItem, CompletionItemKind, Documentation, Location, Position, Range,
    SymbolInformation, SymbolKind, Url,
};

/// UTF-16 column of a byte offset in `line`.
pub fn utf16_column(line: &str, byte_column: usize) -> u32 {
    let end = byte_column.min(line.len());
    match line.get(..end) {
        Some(prefix) => prefix.encode_utf16().count() as u32,
        None => end as u32,
    }
}

/// Prefix of `line` up to a UTF-16 column.
pub fn line_prefix(line: &str, character: u32) -> &str {
    let mut units = 0u32;
    for (i, c) in line.char_indices() {
        if units >= character {
            return &line[..i];
        }
        units += c.len_utf16() as u32;
    }
    line
}

pub fn to_position(position: LensPosition, document: &Document<'_>) -> Position {
    let line = document.line(position.line);
    Position { line: position.line as u32, character: utf16_column(line, position.column) }
}

pub fn to_range(span: Span, document: &Document<'_>) -> Range {
    Range { start: to_position(span.start, document), end: to_position(span.end, document) }
}

fn symbol_kind(kind: LensSymbolKind) -> SymbolKind {
    match kind {
        LensSymbolKind::Variable => SymbolKind::VARIABLE,
        LensSymbolKind::Function => SymbolKind::FUNCTION,
        LensSymbolKind::Class => SymbolKind::CLASS,
        LensSymbolKind::Namespace => SymbolKind::NAMESPACE,
    }
}

pub fn to_symbol_information(symbol: Symbol, uri: &Url, document: &Document<'_>) -> SymbolInformation {
    #[allow(deprecated)]
    SymbolInformation {
        name: symbol.name,
        kind: symbol_kind(symbol.kind),
        tags: None,
        deprecated: None,
        location: Location { uri: uri.clone(), range: to_range(symbol.range, document) },
        container_name: None,
    }
}

pub fn to_color_information(info: LensColor, document: &Document<'_>) -> ColorInformation {
    let (red, green, blue, alpha) = info.color.to_unit();
    ColorInformation {
        range: to_range(info.range, document),
        color: Color { red: red as f32, green: green as f32, blue: blue as f32, alpha: alpha as f32 },
    }
}

fn completion_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Variable => CompletionItemKind::VARIABLE,
        CompletionKind::Function => CompletionItemKind::FUNCTION,
        CompletionKind::Class => CompletionItemKind::CLASS,
        CompletionKind::Property => CompletionItemKind::PROPERTY,
        CompletionKind::Value => CompletionItemKind::VALUE,
        CompletionKind::Keyword => CompletionItemKind::KEYWORD,
    }
}

pub fn to_completion_item(item: LensCompletion) -> CompletionItem {
    CompletionItem {
        label: item.label,
        kind: Some(completion_kind(item.kind)),
        detail: item.detail,
        documentation: item.documentation.map(Documentation::String),
        insert_text: item.insert_text,
        ..Default::default()
    }
}

/// One swatch as sent to the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDecoration {
    pub position: Position,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDecorationsParams {
    pub uri: Url,
    pub decorations: Vec<ColorDecoration>,
}

/// Server to client notification carrying a document's swatches
pub enum ColorDecorations {}

impl Notification for ColorDecorations {
    type Params = ColorDecorationsParams;
    const METHOD: &'static str = "stylus/colorDecorations";
}

pub fn to_color_decoration(decoration: Decoration, document: &Document<'_>) -> ColorDecoration {
    ColorDecoration {
        position: to_position(LensPosition::new(decoration.line, decoration.column), document),
        background: decoration.background,
    }
}
