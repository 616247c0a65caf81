//! Tracing subscriber setup.

use crate::error::ModerationError;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter used when `RUST_LOG` is not set, e.g. `modlens=debug`
    pub level: String,
    pub format: OutputFormat,
    /// Write to daily-rolling files in this directory instead of stderr
    pub log_dir: Option<PathBuf>,
    /// File name prefix for rolling files
    pub file_prefix: String,
    pub include_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Compact,
            log_dir: None,
            file_prefix: "modlens.log".to_string(),
            include_target: true,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verbose human-readable output for local development.
    pub fn development() -> Self {
        Self {
            level: "modlens=debug,info".to_string(),
            format: OutputFormat::Pretty,
            ..Default::default()
        }
    }

    /// Structured JSON output.
    pub fn production() -> Self {
        Self {
            format: OutputFormat::Json,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Install the global subscriber.
///
/// Returns the file writer guard when logging to files; keep it alive for
/// the lifetime of the process or buffered lines are lost. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<Option<WorkerGuard>, ModerationError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            ModerationError::ConfigurationError(format!(
                "invalid log filter '{}': {e}",
                config.level
            ))
        })?;

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(config.include_target)
        .with_ansi(config.log_dir.is_none());

    let installed = match config.format {
        OutputFormat::Compact => builder.compact().try_init(),
        OutputFormat::Pretty => builder.pretty().try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| {
        ModerationError::ConfigurationError(format!("failed to install tracing subscriber: {e}"))
    })?;

    Ok(guard)
}
