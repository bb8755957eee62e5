//! Tracing subscriber setup
//!
//! Stdout always gets a sink; `logging.file` adds a daily-rolled one with
//! ANSI colours off. Both share the format and the `EnvFilter`.

use crate::config::{LogFormat, LoggingConfig};
use crate::constants::LOG_FILTER_ENV;
use libris_domain::error::{Error, Result};
use std::path::Path;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn sink<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.boxed(),
    }
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut sinks = vec![sink(config.format, std::io::stdout, true)];
    if let Some(path) = &config.file {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let prefix = path.file_name().map_or_else(
            || "libris.log".into(),
            |name| name.to_string_lossy().into_owned(),
        );
        let appender = tracing_appender::rolling::daily(directory, prefix);
        sinks.push(sink(config.format, appender, false));
    }

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|e| Error::configuration_with_source("Failed to install log subscriber", e))?;

    info!(%level, format = ?config.format, "logging initialized");
    Ok(())
}

/// Accepts the usual level names in any case, plus `warning`
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(Error::configuration(format!(
            "Invalid log level '{other}', expected trace, debug, info, warn or error"
        ))),
    }
}

pub(crate) fn log_config_source(path: &Path, found: bool) {
    if found {
        info!(path = %path.display(), "configuration file loaded");
    } else {
        warn!(path = %path.display(), "configuration file not found, using defaults");
    }
}
