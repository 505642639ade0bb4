//! TOML-based configuration for paramdoc.
//!
//! Supports a config file (paramdoc.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.sales]
//! driver = "sqlite"
//! connection_string = "${SALES_DB}"
//!
//! [resolver]
//! query_timeout = "30s"
//! max_concurrency = 4
//! abort_on_timeout = false
//!
//! [reports]
//! search_paths = ["./reports"]
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::Driver;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    /// Named data source connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionSettings>,

    /// Resolver configuration.
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Report lookup configuration.
    #[serde(default)]
    pub reports: ReportSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Data source driver (sqlite).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Timeout for a single query (e.g., "30s", "250ms", "5m").
    pub query_timeout: String,

    /// Maximum number of parameters resolved concurrently.
    pub max_concurrency: usize,

    /// Fail the whole request when a query times out.
    pub abort_on_timeout: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            query_timeout: "30s".to_string(),
            max_concurrency: 4,
            abort_on_timeout: false,
        }
    }
}

impl ResolverSettings {
    /// Parsed query timeout.
    pub fn query_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.query_timeout)
    }
}

/// Report lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Directories searched for logical report ids.
    pub search_paths: Vec<String>,

    /// File extension of report definitions.
    pub extension: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            search_paths: vec![".".to_string()],
            extension: "toml".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level filter (overridden by RUST_LOG).
    pub level: String,

    /// Output format: "compact" or "json".
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `PARAMDOC_CONFIG`
    /// 2. `./paramdoc.toml`
    /// 3. `~/.config/paramdoc/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("PARAMDOC_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("paramdoc.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("paramdoc").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Resolve a report identifier to a definition file.
    ///
    /// An identifier naming an existing file is used as is. Otherwise each
    /// search path is tried with `<id>.<extension>`. When nothing matches the
    /// identifier is returned unchanged so the loader reports it as missing.
    pub fn resolve_report(&self, id: &str) -> PathBuf {
        let direct = PathBuf::from(id);
        if direct.is_file() {
            return direct;
        }

        let file_name = format!("{}.{}", id, self.reports.extension);
        for search_path in &self.reports.search_paths {
            let Ok(dir) = expand_env_vars(search_path) else {
                continue;
            };
            let candidate = Path::new(&dir).join(&file_name);
            if candidate.is_file() {
                return candidate;
            }
        }

        direct
    }
}

/// Parse a duration such as "250ms", "30s", "5m" or "1h".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, SettingsError> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| SettingsError::InvalidDuration(s.to_string()))?;

    let invalid = || SettingsError::InvalidDuration(s.to_string());
    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs).ok_or_else(invalid),
        "h" => value.checked_mul(3600).map(Duration::from_secs).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
