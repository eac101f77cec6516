//! Language Server Protocol implementation for Stylus
//!
//! Serves document symbols, document colors, color presentations and
//! completions for `.styl` files, and pushes inline swatches to the editor
//! through the `stylus/colorDecorations` notification after each edit
//! settles.

mod convert;
mod scheduler;
mod server;

pub use convert::{ColorDecoration, ColorDecorations, ColorDecorationsParams};
pub use scheduler::DecorationScheduler;
pub use server::{run_server, StylusLanguageServer};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decorations_params_wire_format() {
        let params = ColorDecorationsParams {
            uri: tower_lsp::lsp_types::Url::parse("file:///theme.styl").unwrap(),
            decorations: vec![ColorDecoration {
                position: tower_lsp::lsp_types::Position { line: 2, character: 8 },
                background: "rgba(10, 20, 30, 0.5)".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "uri": "file:///theme.styl",
                "decorations": [{
                    "position": { "line": 2, "character": 8 },
                    "background": "rgba(10, 20, 30, 0.5)"
                }]
            })
        );
    }
}
