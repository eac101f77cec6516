//! Analysis command implementations (symbols, colors, decorations, complete, ast, presentations)

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::analysis::Analyzer;
use crate::document::Document;

use super::{expand_files, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn read_file(path: &Path) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: {}: {}", path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Run `analyze` over every matched file in parallel and print one JSON
/// entry per file, in argument order.
fn run_files<T, F>(files: &[String], key: &str, analyze: F) -> ExitCode
where
    T: Serialize,
    F: Fn(&str) -> Vec<T> + Sync,
{
    let paths = match expand_files(files) {
        Ok(paths) => paths,
        Err(arg) => {
            eprintln!("Error: No files matched '{}'", arg);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let results: Vec<Result<Value, String>> = paths
        .par_iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            let items = serde_json::to_value(analyze(&text)).map_err(|e| e.to_string())?;
            let mut entry = Map::new();
            entry.insert("file".to_string(), Value::String(path.display().to_string()));
            entry.insert(key.to_string(), items);
            Ok(Value::Object(entry))
        })
        .collect();

    let mut failed = false;
    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    let code = print_json(&entries);
    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        code
    }
}

pub fn run_symbols(analyzer: &Analyzer, files: &[String]) -> ExitCode {
    run_files(files, "symbols", |text| analyzer.symbols(text))
}

pub fn run_colors(analyzer: &Analyzer, files: &[String]) -> ExitCode {
    run_files(files, "colors", |text| analyzer.colors(text))
}

pub fn run_decorations(analyzer: &Analyzer, files: &[String]) -> ExitCode {
    run_files(files, "decorations", |text| analyzer.decorations(text))
}

/// Completions for the text before `column` on `line`.
pub fn run_complete(analyzer: &Analyzer, file: &Path, line: usize, column: Option<usize>) -> ExitCode {
    let text = match read_file(file) {
        Ok(text) => text,
        Err(code) => return code,
    };

    let document = Document::new(&text);
    if line >= document.line_count() {
        eprintln!("Error: line {} is past the end of {}", line, file.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let source = document.line(line);
    let Some(current_word) = source.get(..column.unwrap_or(source.len())) else {
        eprintln!("Error: column is outside line {} or inside a character", line);
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    print_json(&analyzer.completions(&text, current_word))
}

/// Dump the parse tree; parse failures are reported instead of recovered.
pub fn run_ast(analyzer: &Analyzer, file: &Path) -> ExitCode {
    let text = match read_file(file) {
        Ok(text) => text,
        Err(code) => return code,
    };

    match analyzer.ast(&text) {
        Ok(tree) => print_json(&tree),
        Err(e) => {
            eprintln!("Error: {}: {}", file.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[derive(Serialize)]
struct PresentationOutput {
    color: crate::color::Rgba,
    presentations: Vec<String>,
}

pub fn run_presentations(analyzer: &Analyzer, value: &str) -> ExitCode {
    match analyzer.parse_color(value) {
        Some(color) => print_json(&PresentationOutput { color, presentations: analyzer.presentations(&color) }),
        None => {
            eprintln!("Error: '{}' is not a color", value);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
    }
}
