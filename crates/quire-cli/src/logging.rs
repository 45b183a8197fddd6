//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! The libraries only emit events; this module installs the subscriber for
//! the `quire` binary.
//!
//! # Log Levels
//!
//! - `error`: Commands that could not complete
//! - `warn`: Failed saves and reverts, unreadable settings
//! - `info`: Completed opens, saves, reverts and closes
//! - `debug`: Lifecycle state transitions and prompts
//! - `trace`: Everything else
//!
//! # Usage
//!
//! ```ignore
//! use quire_cli::logging::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig { format: LogFormat::Compact, ..LogConfig::default() };
//! init_logging(&config)?;
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events are shown at the configured level.
const QUIRE_CRATES: &[&str] = &[
    "quire_cli",
    "quire_document",
    "quire_formats",
    "quire_model",
    "quire_persistence",
];

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter`.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Write logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    /// The filter directives this configuration installs when `RUST_LOG`
    /// is not consulted or not set.
    pub fn directives(&self) -> String {
        let level = self.level_filter.to_string().to_lowercase();
        let mut directives = vec!["warn".to_string()];
        directives.extend(QUIRE_CRATES.iter().map(|krate| format!("{krate}={level}")));
        directives.join(",")
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            output_layer(config, Mutex::new(file))
        }
        None => output_layer(config, io::stderr),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(build_env_filter(config))
        .init();
    Ok(())
}

/// Formatting layer for the configured format. Events carry no timestamps
/// or targets; the file-backed writer never emits ANSI codes.
fn output_layer<W>(config: &LogConfig, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let ansi = config.with_ansi && config.log_file.is_none();
    let layer = fmt::layer().with_writer(writer).with_target(false);
    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().without_time().with_ansi(ansi).boxed(),
        LogFormat::Pretty => layer.without_time().with_ansi(ansi).boxed(),
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(config.directives())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// `io::Write` handle over a shared buffer, so tests can read back output.
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `emit` under a subscriber built from `config` and return what it wrote.
    fn captured(config: &LogConfig, emit: impl FnOnce()) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry()
            .with(output_layer(config, {
                let buffer = Arc::clone(&buffer);
                move || SharedBuffer(Arc::clone(&buffer))
            }))
            .with(build_env_filter(config));
        tracing::subscriber::with_default(subscriber, emit);

        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn quiet_config(level_filter: LevelFilter, format: LogFormat) -> LogConfig {
        LogConfig {
            level_filter,
            use_env_filter: false,
            with_ansi: false,
            format,
            log_file: None,
        }
    }

    #[test]
    fn test_directives_cover_every_crate() {
        let directives = quiet_config(LevelFilter::DEBUG, LogFormat::Pretty).directives();
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("quire_document=debug"));
        assert!(directives.contains("quire_persistence=debug"));
    }

    #[test]
    fn test_other_crates_stay_at_warn() {
        let config = quiet_config(LevelFilter::INFO, LogFormat::Compact);
        let output = captured(&config, || {
            tracing::info!(target: "quire_document", "saved list.notes");
            tracing::info!(target: "hyper", "connection pooled");
            tracing::debug!(target: "quire_document", "state changed");
        });

        assert!(output.contains("saved list.notes"));
        assert!(!output.contains("connection pooled"));
        assert!(!output.contains("state changed"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_json_lines() {
        let config = quiet_config(LevelFilter::WARN, LogFormat::Json);
        let output = captured(&config, || {
            tracing::warn!(target: "quire_persistence", "restore failed");
        });

        let line = output.trim_end();
        assert!(line.starts_with('{') && line.ends_with('}'));
        assert!(line.contains(r#""level":"WARN""#));
        assert!(line.contains("restore failed"));
    }
}
