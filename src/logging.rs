use crate::config::LogLevel;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Output always goes to stderr:
/// stdout carries JSON for the CLI and the protocol stream for `lsp`.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false);

    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(filter).with(stderr_layer).try_init();
}
