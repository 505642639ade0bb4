//! Parameter dependency graph.
//!
//! Built from the declarations before any query runs. Edges point from a
//! parameter to the parameters that consume its value, so a topological
//! order is a valid resolution order.

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::error::{ResolutionError, ResolutionResult};
use crate::report::ReportDefinition;

/// Dependency DAG over a report's parameters, by declaration index.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl DependencyGraph {
    /// Build and validate the graph.
    ///
    /// Fails on dependencies naming undeclared parameters and on cycles,
    /// including a parameter depending on itself.
    pub fn build(report: &ReportDefinition) -> ResolutionResult<Self> {
        let mut graph = DiGraph::with_capacity(report.parameters.len(), 0);
        let nodes: Vec<NodeIndex> = (0..report.parameters.len())
            .map(|idx| graph.add_node(idx))
            .collect();

        let index_of: HashMap<&str, usize> = report
            .parameters
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.as_str(), idx))
            .collect();

        for (idx, param) in report.parameters.iter().enumerate() {
            for dependency in &param.depends_on {
                let dep_idx = *index_of.get(dependency.as_str()).ok_or_else(|| {
                    ResolutionError::UnknownDependency {
                        parameter: param.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                graph.update_edge(nodes[dep_idx], nodes[idx], ());
            }
        }

        let built = Self { graph, nodes };
        if let Some(cycle) = built.first_cycle() {
            return Err(ResolutionError::CyclicDependency {
                parameters: cycle
                    .into_iter()
                    .map(|idx| report.parameters[idx].name.clone())
                    .collect(),
            });
        }

        Ok(built)
    }

    /// The cycle containing the earliest-declared parameter, if any.
    ///
    /// Returned as declaration indices with the first index repeated at the
    /// end, e.g. `[0, 2, 0]`.
    fn first_cycle(&self) -> Option<Vec<usize>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                if scc.len() == 1 {
                    let idx = scc[0];
                    self.graph.edges_connecting(idx, idx).next().is_some()
                } else {
                    true
                }
            })
            .map(|scc| {
                let mut members: Vec<usize> = scc.iter().map(|n| self.graph[*n]).collect();
                members.sort_unstable();
                members.push(members[0]);
                members
            })
            .min_by_key(|members| members[0])
    }

    /// Declaration indices of the parameters `idx` depends on, sorted.
    pub fn dependencies(&self, idx: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(self.nodes[idx], Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Group parameters into waves that can be resolved concurrently.
    ///
    /// Every parameter lands in the wave after its deepest dependency.
    /// Within a wave indices are in declaration order.
    pub fn waves(&self) -> Vec<Vec<usize>> {
        // Validated acyclic in `build`.
        let order = toposort(&self.graph, None).unwrap_or_default();

        let mut level = vec![0usize; self.nodes.len()];
        for node in order {
            let idx = self.graph[node];
            level[idx] = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|dep| level[self.graph[dep]] + 1)
                .max()
                .unwrap_or(0);
        }

        let depth = level.iter().max().map_or(0, |max| max + 1);
        let mut waves = vec![Vec::new(); depth];
        for (idx, lvl) in level.into_iter().enumerate() {
            waves[lvl].push(idx);
        }
        waves
    }
}
