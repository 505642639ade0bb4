//! # paramdoc
//!
//! Report parameter discovery: resolves a report's declared parameters
//! against their data queries and renders them as an XML prompt document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Report Definition (TOML)                    │
//! │        (parameters, list bindings, queries)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report::load]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 ReportDefinition                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver]  ◄──── [query] DataSource
//! ┌─────────────────────────────────────────────────────────┐
//! │     ParameterDocument (values run through [encoding])    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [xml]
//! ┌─────────────────────────────────────────────────────────┐
//! │   <parameters><parameter><value .../></parameter>...     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod encoding;
pub mod generate;
pub mod logging;
pub mod query;
pub mod report;
pub mod resolver;
pub mod xml;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::encoding::{decode, encode, Encoded};
    pub use crate::generate::{GenerateError, OutputFormat, ParameterContentGenerator};
    pub use crate::query::{
        DataSource, ParameterContext, QueryError, QueryExecutor, QueryResult, SqliteDataSource,
    };
    pub use crate::report::{
        ParameterDeclaration, ParameterKind, ReportDefinition, ScalarType, ScalarValue,
    };
    pub use crate::resolver::{
        ParameterDocument, ParameterOverrides, ParameterResolver, ResolutionError, ResolveOptions,
        ResolvedValue,
    };
}

pub use generate::{GenerateError, OutputFormat, ParameterContentGenerator};
pub use resolver::{ParameterDocument, ParameterOverrides};
