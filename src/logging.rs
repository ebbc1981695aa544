/// Structured logging setup using tracing
///
/// Writes to stderr only: stdout carries the JSON-RPC stream when serving.
/// `log_format = "auto"` picks ANSI text on a terminal and JSON when piped.
/// When `log_file` is set, a JSON copy of every event is appended there too.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use crate::config::{Config, LogFormat};

/// Resolve `auto` against whether stderr is attached to a terminal.
pub fn resolve_format(format: LogFormat, stderr_is_terminal: bool) -> LogFormat {
    match format {
        LogFormat::Auto if stderr_is_terminal => LogFormat::Pretty,
        LogFormat::Auto => LogFormat::Json,
        explicit => explicit,
    }
}

fn file_layer<S>(path: Option<&str>) -> Option<impl Layer<S>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let path = path?;
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!("Cannot open log file '{}' ({}), logging to stderr only", path, e);
            None
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Log level comes from config.log_level; RUST_LOG overrides it at runtime.
pub fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let format = resolve_format(config.log_format, std::io::stderr().is_terminal());
    let log_file = config.log_file.as_deref();

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr).json())
                .with(file_layer(log_file))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
                .with(file_layer(log_file))
                .init();
        }
    }
}
