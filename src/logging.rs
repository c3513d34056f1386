//! Structured logging setup using the `tracing` ecosystem.
//!
//! The relay server gets a full `tracing-subscriber` with either JSON
//! output (for production) or pretty-printed output (for TTY / local
//! dev); the format is auto-detected from the terminal but can be
//! forced via `--json` or `--pretty`. The one-shot CLI path gets a
//! quiet warn-level subscriber writing to stderr so tracking reports
//! on stdout stay clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let tracing_level = level.to_tracing_level();
    let filter = tracing_subscriber::filter::Targets::new().with_default(tracing_level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

/// Subscriber for the one-shot tracking command: warnings and errors
/// only, compact, on stderr. Stdout is reserved for the report itself.
pub fn init_cli() {
    let filter = tracing_subscriber::filter::Targets::new().with_default(tracing::Level::WARN);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}
