//! Long-running commands (watch, lsp)

use std::path::PathBuf;
use std::process::ExitCode;

use crate::analysis::Analyzer;
use crate::config::WatchConfig;
use crate::watch::{watch_and_analyze, WatchOptions};

use super::{EXIT_ERROR, EXIT_SUCCESS};

pub fn run_watch(analyzer: &Analyzer, dir: PathBuf, config: WatchConfig) -> ExitCode {
    match watch_and_analyze(WatchOptions { dir, config }, analyzer) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Start the LSP server; `initializationOptions` replace `config` per session.
#[cfg(feature = "lsp")]
pub fn run_lsp(config: crate::config::LensConfig) -> ExitCode {
    use tokio::runtime::Runtime;

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    rt.block_on(crate::lsp::run_server(config));
    ExitCode::from(EXIT_SUCCESS)
}
