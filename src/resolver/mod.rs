//! Parameter resolution.
//!
//! The resolver turns a [`ReportDefinition`] plus caller overrides into a
//! [`ParameterDocument`]:
//!
//! ```text
//! declarations ──► DependencyGraph (unknown deps / cycles abort here)
//!                        │
//!                        ▼  waves of independent parameters
//!              ┌───────────────────────┐
//!              │ plain  → overrides or defaults
//!              │ list   → QueryExecutor → rows → ResolvedValue
//!              └───────────────────────┘
//!                        │  (concurrent within a wave)
//!                        ▼
//!        ParameterDocument (declaration order)
//! ```
//!
//! A query failure only fails its own parameter and the parameters that
//! depend on it; siblings still resolve.

mod document;
mod error;
mod graph;
mod overrides;

pub use document::{ParameterDocument, ParameterEntry, ResolvedValue};
pub use error::{ResolutionError, ResolutionResult};
pub use graph::DependencyGraph;
pub use overrides::ParameterOverrides;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::ResolverSettings;
use crate::query::{ParameterContext, QueryExecutor, QueryResult};
use crate::report::{ListBinding, ParameterDeclaration, ReportDefinition, ScalarValue};

static NULL_CELL: ScalarValue = ScalarValue::Null;

/// Options for a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Upper bound on parameters resolved at the same time.
    pub max_concurrency: usize,
    /// Fail the whole request when any query times out.
    pub abort_on_timeout: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            abort_on_timeout: false,
        }
    }
}

impl ResolveOptions {
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self {
            max_concurrency: settings.max_concurrency,
            abort_on_timeout: settings.abort_on_timeout,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_abort_on_timeout(mut self, abort: bool) -> Self {
        self.abort_on_timeout = abort;
        self
    }
}

/// Resolves report parameters through a [`QueryExecutor`].
pub struct ParameterResolver<'a> {
    executor: &'a QueryExecutor,
    options: ResolveOptions,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self {
            executor,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve every declared parameter of `report`.
    ///
    /// Errors only when the dependency graph is invalid, or when a query
    /// times out and `abort_on_timeout` is set. Other failures are recorded
    /// on the affected entries.
    pub async fn resolve(
        &self,
        report: &ReportDefinition,
        overrides: &ParameterOverrides,
    ) -> ResolutionResult<ParameterDocument> {
        let graph = DependencyGraph::build(report)?;
        let mut slots: Vec<Option<ParameterEntry>> = vec![None; report.parameters.len()];

        for wave in graph.waves() {
            let jobs: Vec<_> = wave
                .into_iter()
                .map(|idx| {
                    let upstream = upstream_context(report, &graph, &slots, idx);
                    async move { (idx, self.resolve_one(report, idx, overrides, upstream).await) }
                })
                .collect();

            let finished: Vec<(usize, ParameterEntry)> = stream::iter(jobs)
                .buffer_unordered(self.options.max_concurrency.max(1))
                .collect()
                .await;

            for (idx, entry) in finished {
                if self.options.abort_on_timeout {
                    if let Some(error) = entry.error.as_ref().filter(|e| e.is_timeout()) {
                        return Err(error.clone());
                    }
                }
                slots[idx] = Some(entry);
            }
        }

        Ok(ParameterDocument {
            report: report.name.clone(),
            parameters: slots.into_iter().flatten().collect(),
        })
    }

    async fn resolve_one(
        &self,
        report: &ReportDefinition,
        idx: usize,
        overrides: &ParameterOverrides,
        upstream: ResolutionResult<ParameterContext>,
    ) -> ParameterEntry {
        let decl = &report.parameters[idx];

        let context = match upstream {
            Ok(context) => context,
            Err(error) => {
                warn!(parameter = %decl.name, %error, "skipping parameter");
                return ParameterEntry::failed(decl.clone(), error);
            }
        };

        let requested: Vec<String> = overrides
            .get(&decl.name)
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| decl.defaults.clone());

        let entry = match &decl.list {
            None => plain_entry(decl, requested),
            Some(binding) => {
                match self
                    .resolve_list(report, decl, binding, &requested, &context)
                    .await
                {
                    Ok(entry) => entry,
                    Err(error) => {
                        warn!(parameter = %decl.name, %error, "parameter failed");
                        ParameterEntry::failed(decl.clone(), error)
                    }
                }
            }
        };

        debug!(
            parameter = %decl.name,
            values = entry.values.len(),
            selected = entry.selection.len(),
            "resolved parameter"
        );
        entry
    }

    async fn resolve_list(
        &self,
        report: &ReportDefinition,
        decl: &ParameterDeclaration,
        binding: &ListBinding,
        requested: &[String],
        context: &ParameterContext,
    ) -> ResolutionResult<ParameterEntry> {
        let table = self
            .executor
            .execute(&binding.query, report, context)
            .await
            .map_err(|source| ResolutionError::Query {
                parameter: decl.name.clone(),
                source,
            })?;

        if table.column_count() == 0 {
            return Ok(ParameterEntry::resolved(decl.clone(), vec![], vec![]));
        }

        let value_idx = locate_column(decl, binding, &table, binding.value_column.as_deref())?
            .unwrap_or(0);
        let label_idx = locate_column(decl, binding, &table, binding.label_column.as_deref())?
            .unwrap_or(value_idx);

        let mut values = Vec::with_capacity(table.row_count());
        let mut selection = Vec::new();

        for row in table.rows() {
            let value = row.get(value_idx).unwrap_or(&NULL_CELL);
            let label = row.get(label_idx).unwrap_or(&NULL_CELL);

            // Binary values are matched and passed downstream in base64 form.
            let key = value.to_text();
            let selected = key.as_ref().is_some_and(|k| requested.contains(k))
                && (decl.is_multi_value() || selection.is_empty());

            values.push(ResolvedValue::from_cells(value, label, selected));
            if let Some(key) = key.filter(|_| selected) {
                selection.push(key);
            }
        }

        Ok(ParameterEntry::resolved(decl.clone(), values, selection))
    }
}

/// Plain parameters echo the override, else the defaults.
fn plain_entry(decl: &ParameterDeclaration, requested: Vec<String>) -> ParameterEntry {
    let chosen: Vec<String> = if decl.is_multi_value() {
        requested
    } else {
        requested.into_iter().take(1).collect()
    };

    let values = chosen
        .iter()
        .map(|v| ResolvedValue::new(v, v, true))
        .collect();

    ParameterEntry::resolved(decl.clone(), values, chosen)
}

/// Selections of the parameters `idx` depends on.
fn upstream_context(
    report: &ReportDefinition,
    graph: &DependencyGraph,
    slots: &[Option<ParameterEntry>],
    idx: usize,
) -> ResolutionResult<ParameterContext> {
    let mut context = ParameterContext::new();

    for dep in graph.dependencies(idx) {
        let upstream = &report.parameters[dep].name;
        match slots[dep].as_ref() {
            Some(entry) if !entry.is_failed() => {
                context.insert(upstream.clone(), entry.selection.clone());
            }
            _ => {
                return Err(ResolutionError::UpstreamFailed {
                    parameter: report.parameters[idx].name.clone(),
                    upstream: upstream.clone(),
                })
            }
        }
    }

    Ok(context)
}

fn locate_column(
    decl: &ParameterDeclaration,
    binding: &ListBinding,
    table: &QueryResult,
    column: Option<&str>,
) -> ResolutionResult<Option<usize>> {
    match column {
        None => Ok(None),
        Some(name) => table
            .column_index(name)
            .map(Some)
            .ok_or_else(|| ResolutionError::MissingColumn {
                parameter: decl.name.clone(),
                query: binding.query.clone(),
                column: name.to_string(),
            }),
    }
}
