//! Color normalization
//!
//! Resolves extracted occurrences to document ranges, drops the ones whose
//! channels could not be computed, and reports each source position once.

use crate::color::Rgba;
use crate::document::Document;
use crate::extract::{colors_in_nodes, ColorKind, ColorOccurrence};
use crate::flatten::flatten;
use crate::parser::{build_ast, StylusParser};
use crate::position::{closing_paren_column, find_column_from, Position, Span};
use serde::Serialize;
use std::collections::HashSet;

/// A color and the source range it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorInformation {
    pub range: Span,
    pub color: Rgba,
}

/// Range of an occurrence on its line.
///
/// The start is the first match of the occurrence's text at or after the
/// parser column; a call ends after the first `)` that follows its name, or
/// at the end of the line when the call is not closed there.
pub fn occurrence_range(occurrence: &ColorOccurrence, document: &Document<'_>) -> Span {
    let line = occurrence.line;
    let text = document.line(line);
    let start = find_column_from(&occurrence.text, text, occurrence.column);
    let end = match occurrence.kind {
        ColorKind::FunctionColor => closing_paren_column(text, start).unwrap_or(text.len()),
        ColorKind::NamedColor | ColorKind::RgbaLiteral => start + occurrence.text.len(),
    };
    Span::new(Position::new(line, start), Position::new(line, end))
}

pub fn normalize_colors(occurrences: Vec<ColorOccurrence>, document: &Document<'_>) -> Vec<ColorInformation> {
    let mut seen = HashSet::new();
    let mut colors = Vec::new();

    for occurrence in occurrences {
        let color = match &occurrence.color {
            Ok(color) => *color,
            Err(err) => {
                tracing::trace!(
                    line = occurrence.line,
                    column = occurrence.column,
                    text = %occurrence.text,
                    "skipping color: {}",
                    err
                );
                continue;
            }
        };

        let range = occurrence_range(&occurrence, document);
        if seen.insert(range.start) {
            colors.push(ColorInformation { range, color });
        }
    }
    colors
}

/// Every color of a document, in discovery order.
pub fn document_colors(parser: &dyn StylusParser, text: &str) -> Vec<ColorInformation> {
    let document = Document::new(text);
    let tree = build_ast(parser, text);
    normalize_colors(colors_in_nodes(flatten(&tree)), &document)
}
