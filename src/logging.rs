//! Logging setup, powered by tracing-subscriber.
//!
//! Library code only emits `tracing` events and spans. Binaries call
//! [`init`] once; output goes to stderr so stdout stays free for the
//! generated document.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid tracing filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Build the filter: `RUST_LOG` when set, else `level` plus quiet defaults
/// for chatty dependencies.
fn build_env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let filter_str = format!("{},rusqlite=warn", level);
    EnvFilter::try_new(&filter_str).map_err(|e| LoggingError::InvalidFilter {
        filter: filter_str.clone(),
        message: e.to_string(),
    })
}

/// Initialize the global subscriber.
///
/// `verbosity` raises the configured level: 1 → debug, 2+ → trace.
pub fn init(settings: &LoggingSettings, verbosity: u8) -> Result<(), LoggingError> {
    let level = match verbosity {
        0 => settings.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = build_env_filter(level)?;

    let result = match LogFormat::from_str(&settings.format) {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init(),
    };

    result.map_err(|_| LoggingError::AlreadyInitialized)?;
    tracing::trace!(level, format = %settings.format, "logging initialized");
    Ok(())
}
