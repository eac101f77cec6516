//! Configuration schema types for `stylus-lens.toml`
//!
//! Every section and field has a default, so an empty file (or an empty
//! `initializationOptions` object) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log verbosity used when `RUST_LOG` is not set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Color provider and swatch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorsConfig {
    /// Serve document colors
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Publish inline swatches
    #[serde(default = "default_true")]
    pub decorations: bool,
    /// Swatches per document above which the rest are dropped
    #[serde(default = "default_max_decorations")]
    pub max_decorations: usize,
    /// Quiet time after an edit before swatches are recomputed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decorations: true,
            max_decorations: default_max_decorations(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_decorations() -> usize {
    crate::decorations::MAX_DECORATIONS
}

fn default_debounce_ms() -> u64 {
    400
}

/// Document outline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Completion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Insert `name: ` instead of `name ` for properties
    #[serde(default = "default_true")]
    pub use_separator: bool,
    /// CSS schema JSON replacing the bundled one, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { enabled: true, use_separator: true, schema: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce window for file system events
    #[serde(default = "default_watch_debounce_ms")]
    pub debounce_ms: u64,
    /// File extensions that trigger a re-run
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_watch_debounce_ms(), extensions: default_extensions() }
    }
}

fn default_watch_debounce_ms() -> u64 {
    100
}

fn default_extensions() -> Vec<String> {
    vec!["styl".to_string(), "stylus".to_string()]
}

/// Root configuration structure for `stylus-lens.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "colors.max_decorations")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stylus-lens.toml: '{}' {}", self.field, self.message)
    }
}

impl LensConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.colors.max_decorations == 0 {
            errors.push(ConfigValidationError {
                field: "colors.max_decorations".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.watch.extensions.is_empty() {
            errors.push(ConfigValidationError {
                field: "watch.extensions".to_string(),
                message: "must contain at least one extension".to_string(),
            });
        }

        for (i, ext) in self.watch.extensions.iter().enumerate() {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(ConfigValidationError {
                    field: format!("watch.extensions[{}]", i),
                    message: "must be an extension without a leading dot".to_string(),
                });
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
