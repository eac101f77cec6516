//! Configuration loading and discovery for `stylus-lens.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{LensConfig, LogLevel};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for in the working directory and its parents
pub const CONFIG_FILE: &str = "stylus-lens.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse stylus-lens.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Malformed `initializationOptions`
    #[error("Failed to parse initialization options: {0}")]
    Options(#[from] serde_json::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the decoration cap
    pub max_decorations: Option<usize>,
    /// Override the property separator setting
    pub use_separator: Option<bool>,
    /// Override the CSS schema file
    pub schema: Option<PathBuf>,
    /// Override the log level
    pub log_level: Option<LogLevel>,
}

/// Find stylus-lens.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for stylus-lens.toml
/// 2. Check XDG_CONFIG_HOME/stylus-lens/stylus-lens.toml (or ~/.config/stylus-lens/stylus-lens.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find stylus-lens.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("stylus-lens").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find stylus-lens.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a stylus-lens.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the defaults.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("site/stylus-lens.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<LensConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(LensConfig::default()),
    }
}

/// Load configuration from a specific file path.
///
/// A relative `completion.schema` is resolved against the file's directory.
fn load_config_file(path: &Path) -> Result<LensConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path)?;
    let mut config: LensConfig = toml::from_str(&contents)?;

    if let (Some(root), Some(schema)) = (project_root(path), config.completion.schema.as_ref()) {
        config.completion.schema = Some(resolve_path(root, schema));
    }

    check(config)
}

/// Configuration sent by an editor as LSP `initializationOptions`.
///
/// A missing or `null` value gives the defaults.
pub fn config_from_options(options: Option<serde_json::Value>) -> Result<LensConfig, ConfigError> {
    match options {
        None | Some(serde_json::Value::Null) => Ok(LensConfig::default()),
        Some(value) => check(serde_json::from_value(value)?),
    }
}

fn check(config: LensConfig) -> Result<LensConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut LensConfig, overrides: &CliOverrides) {
    if let Some(max) = overrides.max_decorations {
        config.colors.max_decorations = max;
    }
    if let Some(use_separator) = overrides.use_separator {
        config.completion.use_separator = use_separator;
    }
    if let Some(ref schema) = overrides.schema {
        config.completion.schema = Some(schema.clone());
    }
    if let Some(level) = overrides.log_level {
        config.log.level = level;
    }
}

/// Directory holding a config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[colors]\nenabled = true");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("styles").join("components");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r#"
[colors]
max_decorations = 20

[completion]
schema = "css.json"
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.colors.max_decorations, 20);
        assert_eq!(config.completion.schema, Some(temp.path().join("css.json")));
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[colors]\nmax_decorations = 0");

        let result = load_config(Some(&config_path));
        let Err(ConfigError::Validation(errors)) = result else { panic!("expected validation error") };
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("colors.max_decorations"));
    }

    #[test]
    #[serial]
    fn test_xdg_config_fallback() {
        let temp = TempDir::new().expect("should create temp dir");
        let dir = temp.path().join("stylus-lens");
        fs::create_dir_all(&dir).expect("should create config dir");
        let config_path = write_config(&dir, "");

        let previous = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_config_from_options() {
        assert_eq!(config_from_options(None).unwrap(), LensConfig::default());
        assert_eq!(config_from_options(Some(serde_json::Value::Null)).unwrap(), LensConfig::default());

        let options = serde_json::json!({ "colors": { "decorations": false }, "completion": { "use_separator": false } });
        let config = config_from_options(Some(options)).unwrap();
        assert!(!config.colors.decorations);
        assert!(!config.completion.use_separator);
        assert_eq!(config.colors.max_decorations, 500);
    }

    #[test]
    fn test_config_from_bad_options() {
        let result = config_from_options(Some(serde_json::json!({ "colors": { "enabled": "yes" } })));
        assert!(matches!(result, Err(ConfigError::Options(_))));

        let result = config_from_options(Some(serde_json::json!({ "watch": { "extensions": [] } })));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = LensConfig::default();
        let overrides = CliOverrides {
            max_decorations: Some(3),
            use_separator: Some(false),
            log_level: Some(LogLevel::Trace),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.colors.max_decorations, 3);
        assert!(!config.completion.use_separator);
        assert_eq!(config.log.level, LogLevel::Trace);
        assert_eq!(config.completion.schema, None);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("a/b.json")), PathBuf::from("/project/a/b.json"));
        assert_eq!(resolve_path(root, Path::new("/abs.json")), PathBuf::from("/abs.json"));
    }
}
