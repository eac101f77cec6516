//! Configuration for the analyzer, the language server and the CLI
//!
//! Provides types and discovery for `stylus-lens.toml`.

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, ConfigError};
pub use schema::*;
