//! End-to-end parameter content generation.
//!
//! This module provides the high-level API that ties the pipeline together:
//!
//! ```text
//! Report id → Load definition → Resolve parameters → Serialize → Sink
//! ```
//!
//! # Example
//!
//! ```ignore
//! use paramdoc::config::Settings;
//! use paramdoc::generate::{OutputFormat, ParameterContentGenerator};
//! use paramdoc::resolver::ParameterOverrides;
//!
//! let generator = ParameterContentGenerator::from_settings(Settings::load()?)?;
//! let overrides = ParameterOverrides::new().set("region", "EMEA");
//!
//! generator
//!     .generate("reports/sales.toml", &overrides, OutputFormat::Xml, std::io::stdout())
//!     .await?;
//! ```

use std::io::{self, Write};

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Settings, SettingsError};
use crate::query::QueryExecutor;
use crate::report::{self, LoadError};
use crate::resolver::{
    ParameterDocument, ParameterOverrides, ParameterResolver, ResolutionError, ResolveOptions,
};
use crate::xml;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort a generation request.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

// ============================================================================
// Options
// ============================================================================

/// Output format of [`ParameterContentGenerator::generate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The parameter XML document.
    #[default]
    Xml,
    /// The same document as pretty-printed JSON.
    Json,
}

// ============================================================================
// Generator
// ============================================================================

/// Produces parameter documents for report definitions.
pub struct ParameterContentGenerator {
    settings: Settings,
    executor: QueryExecutor,
    options: ResolveOptions,
}

impl ParameterContentGenerator {
    /// Build a generator whose executor serves the configured connections.
    pub fn from_settings(settings: Settings) -> GenerateResult<Self> {
        let executor = QueryExecutor::from_settings(&settings)?;
        let options = ResolveOptions::from_settings(&settings.resolver);
        Ok(Self {
            settings,
            executor,
            options,
        })
    }

    /// Build a generator around an existing executor.
    pub fn with_executor(executor: QueryExecutor) -> Self {
        Self {
            settings: Settings::default(),
            executor,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Load `report_id` and resolve its parameters.
    pub async fn document(
        &self,
        report_id: &str,
        overrides: &ParameterOverrides,
    ) -> GenerateResult<ParameterDocument> {
        let request_id = Uuid::new_v4();
        let span = info_span!("parameters", %request_id, report = report_id);

        async {
            let path = self.settings.resolve_report(report_id);
            let report = report::load(&path)?;

            let document = ParameterResolver::new(&self.executor)
                .with_options(self.options.clone())
                .resolve(&report, overrides)
                .await?;

            for entry in document.failed() {
                if let Some(error) = &entry.error {
                    warn!(parameter = entry.name(), %error, "parameter not resolved");
                }
            }
            info!(
                parameters = document.parameters.len(),
                failed = document.failed().count(),
                prompt_needed = document.is_prompt_needed(),
                "resolved report parameters"
            );

            Ok::<_, GenerateError>(document)
        }
        .instrument(span)
        .await
    }

    /// Resolve `report_id` and write the document to `sink`.
    pub async fn generate<W: Write>(
        &self,
        report_id: &str,
        overrides: &ParameterOverrides,
        format: OutputFormat,
        mut sink: W,
    ) -> GenerateResult<ParameterDocument> {
        let document = self.document(report_id, overrides).await?;

        match format {
            OutputFormat::Xml => xml::serialize(&document, &mut sink)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut sink, &document)?;
                sink.write_all(b"\n")?;
            }
        }
        sink.flush()?;

        Ok(document)
    }
}
