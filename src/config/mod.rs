//! Configuration module for paramdoc.
//!
//! Handles data source connections, resolver tuning, report lookup and logging.

mod connection;
mod settings;

pub use connection::{ConnectionError, Driver};
pub use settings::{
    expand_env_vars, parse_duration, ConnectionSettings, LoggingSettings, ReportSettings,
    ResolverSettings, Settings, SettingsError,
};
