//! Logging setup for fileshare.
//!
//! Log output always goes to stdout. When `logging.file` is non-empty the
//! same lines are also appended to that file.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{FileShareError, Result};

/// Parse log level string to tracing Level. Unknown names mean `info`.
fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` wins over the configured level when both are present.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy()
}

/// Install the global subscriber.
fn install<W>(writer: W, ansi: bool, level: &str) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| FileShareError::Config(format!("logging already initialized: {e}")))
}

/// Initialize logging from the given configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file = config.file.trim();
    if file.is_empty() {
        return install(std::io::stdout, true, &config.level);
    }

    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new().create(true).append(true).open(file)?;
    install(std::io::stdout.and(Arc::new(log_file)), false, &config.level)
}

/// Initialize console-only logging.
///
/// Does nothing if a subscriber is already installed.
pub fn init_console_only(level: &str) {
    let _ = install(std::io::stdout, true, level);
}
