// Local crates
use crate::helpers::load_config::LoggingConfig;

// External crates
use is_terminal::IsTerminal;
use std::{io, panic};
use tracing::error;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    filter::{Directive, EnvFilter},
    fmt,
    prelude::*,
    registry::Registry,
};

/// Diagnostics stay quiet unless asked for, standard output belongs to the events.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_FILE_NAME: &str = "event_watch.log";

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = cfg.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        match level.parse::<Directive>() {
            Ok(directive) => EnvFilter::default().add_directive(directive),
            Err(_) => EnvFilter::new(DEFAULT_LOG_LEVEL),
        }
    })
}

/// Install the global subscriber. Diagnostics go to stderr, and to a daily rolling
/// file when `logging.directory` is set.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the program.
pub fn init_tracing(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = build_filter(cfg);

    let (file_writer, guard) = match cfg.directory.as_deref() {
        Some(directory) => {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling::daily(directory, LOG_FILE_NAME));
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_ansi = io::stderr().is_terminal();
    let stderr_layer = (!cfg.json).then(|| {
        fmt::layer()
            .with_ansi(stderr_ansi)
            .with_writer(io::stderr)
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    });

    let json_layer = cfg.json.then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    });

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    });

    let subscriber = Registry::default()
        .with(filter)
        .with(stderr_layer)
        .with(json_layer)
        .with(file_layer)
        .with(ErrorLayer::default());

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing subscriber already installed: {e}");
    }

    guard
}

pub fn init_panic_handler() {
    panic::set_hook(Box::new(|panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => (*s).to_string(),
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.clone(),
                None => "Unknown panic".to_string(),
            },
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(
            message = %msg,
            location = %location,
            "Application panicked!"
        );
        eprintln!("event-watch panicked at {location}: {msg}");
    }));
}
