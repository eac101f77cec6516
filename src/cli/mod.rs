//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod report;
mod serve;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::analysis::Analyzer;
use crate::config::loader::{load_config, merge_cli_overrides, CliOverrides};
use crate::config::{LensConfig, LogLevel};
use crate::logging::init_logging;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Expand file arguments, each a path or a glob pattern.
///
/// Returns the first argument that matched nothing as the error.
pub fn expand_files(args: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for arg in args {
        let before = files.len();
        if let Ok(paths) = glob(arg) {
            files.extend(paths.filter_map(Result::ok).filter(|p| p.is_file()));
        }
        if files.len() == before {
            let path = Path::new(arg);
            if !path.exists() {
                return Err(arg.clone());
            }
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliLogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Off => LogLevel::Off,
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// stylus-lens - symbols, colors and completions for Stylus stylesheets
#[derive(Parser)]
#[command(name = "stylus-lens")]
#[command(about = "Stylus editor intelligence: symbols, colors and completions from the parse tree")]
#[command(version)]
pub struct Cli {
    /// Config file (default: discover stylus-lens.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<CliLogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the document outline of each file as JSON
    Symbols {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the colors found in each file as JSON
    Colors {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the inline swatches of each file as JSON
    Decorations {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Maximum swatches per file
        #[arg(long)]
        max: Option<usize>,
    },

    /// Print completions for a position in a file as JSON
    Complete {
        file: PathBuf,

        /// 0-based line
        #[arg(long)]
        line: usize,

        /// 0-based byte column; defaults to the end of the line
        #[arg(long)]
        column: Option<usize>,

        /// Insert `name ` instead of `name: ` for properties
        #[arg(long)]
        no_separator: bool,
    },

    /// Print the parse tree of a file as JSON
    Ast { file: PathBuf },

    /// Print the alternative spellings of a color
    Presentations {
        /// Any color value: `#336699`, `teal`, `hsl(120, 50%, 50%)`, ...
        color: String,
    },

    /// Re-analyze stylesheets below a directory whenever they change
    Watch {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Start the language server on stdin/stdout
    #[cfg(feature = "lsp")]
    Lsp,
}

fn overrides(cli: &Cli) -> CliOverrides {
    let mut overrides = CliOverrides { log_level: cli.log_level.map(LogLevel::from), ..Default::default() };
    match &cli.command {
        Commands::Decorations { max, .. } => overrides.max_decorations = *max,
        Commands::Complete { no_separator: true, .. } => overrides.use_separator = Some(false),
        _ => {}
    }
    overrides
}

fn configure(cli: &Cli) -> Result<LensConfig, ExitCode> {
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };
    merge_cli_overrides(&mut config, &overrides(cli));
    Ok(config)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match configure(&cli) {
        Ok(config) => config,
        Err(code) => return code,
    };
    init_logging(config.log.level);

    let analyzer = match Analyzer::from_config(config.clone()) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Symbols { files } => report::run_symbols(&analyzer, &files),
        Commands::Colors { files } => report::run_colors(&analyzer, &files),
        Commands::Decorations { files, .. } => report::run_decorations(&analyzer, &files),
        Commands::Complete { file, line, column, .. } => report::run_complete(&analyzer, &file, line, column),
        Commands::Ast { file } => report::run_ast(&analyzer, &file),
        Commands::Presentations { color } => report::run_presentations(&analyzer, &color),
        Commands::Watch { dir } => serve::run_watch(&analyzer, dir, config.watch),
        #[cfg(feature = "lsp")]
        Commands::Lsp => serve::run_lsp(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_expand_files_globs_and_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.styl"), "").unwrap();
        std::fs::write(temp.path().join("b.styl"), "").unwrap();
        std::fs::write(temp.path().join("c.css"), "").unwrap();

        let pattern = format!("{}/*.styl", temp.path().display());
        let found = expand_files(&[pattern]).unwrap();
        assert_eq!(found.len(), 2);

        let plain = temp.path().join("c.css").display().to_string();
        assert_eq!(expand_files(&[plain]).unwrap().len(), 1);
    }

    #[test]
    fn test_expand_files_reports_unmatched() {
        let missing = "/nonexistent/*.styl".to_string();
        assert_eq!(expand_files(&[missing.clone()]), Err(missing));
    }

    #[test]
    fn test_overrides_from_subcommand() {
        let cli = Cli::parse_from(["stylus-lens", "--log-level", "debug", "decorations", "a.styl", "--max", "3"]);
        let overrides = overrides(&cli);
        assert_eq!(overrides.max_decorations, Some(3));
        assert_eq!(overrides.log_level, Some(LogLevel::Debug));

        let cli = Cli::parse_from(["stylus-lens", "complete", "a.styl", "--line", "1", "--no-separator"]);
        assert_eq!(super::overrides(&cli).use_separator, Some(false));
    }
}
