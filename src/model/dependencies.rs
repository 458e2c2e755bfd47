//! Reconstructs which submodel depended on which from the registry access log.
//!
//! Phase-2 ordering is trusted by default: the assembler runs submodels in
//! registration order and never reorders them. The report makes the implied
//! dependencies visible and can flag stale reads, where a submodel consumed a
//! variable that a later submodel overwrote during the same phase.

use crate::error::{ModelError, Result};
use crate::variables::{Access, AccessKind, Phase};
use petgraph::algo::is_cyclic_directed;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A read whose value was replaced after it was consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleRead {
    pub reader: String,
    pub writer: String,
    pub variable: String,
}

/// Submodels as nodes; an edge `writer -> reader` labelled with the variable.
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    graph: DiGraph<String, String>,
    indices: HashMap<String, NodeIndex>,
    stale_reads: Vec<StaleRead>,
}

impl DependencyReport {
    pub fn from_access_log<'a>(submodels: impl IntoIterator<Item = &'a str>, log: &[Access]) -> Self {
        let mut report = DependencyReport::default();
        for name in submodels {
            report.node(name);
        }

        let mut seen_edges: HashSet<(NodeIndex, NodeIndex, &str)> = HashSet::new();
        for access in log.iter().filter(|a| a.kind == AccessKind::Read) {
            if let Some(writer) = access.writer.as_deref().filter(|w| *w != access.submodel) {
                let from = report.node(writer);
                let to = report.node(&access.submodel);
                if seen_edges.insert((from, to, access.variable.as_str())) {
                    report.graph.add_edge(from, to, access.variable.clone());
                }
            }
        }

        report.stale_reads = find_stale_reads(log);
        report
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }

    fn neighbours(&self, submodel: &str, direction: Direction) -> Vec<&str> {
        let Some(&index) = self.indices.get(submodel) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Submodels whose output `submodel` read.
    pub fn dependencies_of(&self, submodel: &str) -> Vec<&str> {
        self.neighbours(submodel, Direction::Incoming)
    }

    /// Submodels that read output of `submodel`.
    pub fn dependents_of(&self, submodel: &str) -> Vec<&str> {
        self.neighbours(submodel, Direction::Outgoing)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cycles are legal (a submodel may both feed and consume another across
    /// phases) but worth knowing about when debugging an ordering.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    pub fn stale_reads(&self) -> &[StaleRead] {
        &self.stale_reads
    }

    /// Fails on the first stale read.
    pub fn check_stale_reads(&self) -> Result<()> {
        match self.stale_reads.first() {
            Some(stale) => Err(ModelError::OrderingViolation {
                reader: stale.reader.clone(),
                writer: stale.writer.clone(),
                variable: stale.variable.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Graphviz rendering, one node per submodel.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

fn find_stale_reads(log: &[Access]) -> Vec<StaleRead> {
    let coupled: Vec<&Access> = log.iter().filter(|a| a.phase == Phase::Coupled).collect();
    let mut found: Vec<StaleRead> = Vec::new();
    for (position, read) in coupled.iter().enumerate() {
        if read.kind != AccessKind::Read {
            continue;
        }
        let overwrite = coupled[position + 1..].iter().find(|later| {
            later.kind == AccessKind::Write && later.variable == read.variable && later.submodel != read.submodel
        });
        if let Some(write) = overwrite {
            let stale = StaleRead {
                reader: read.submodel.clone(),
                writer: write.submodel.clone(),
                variable: read.variable.clone(),
            };
            if !found.contains(&stale) {
                found.push(stale);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(submodel: &str, variable: &str, kind: AccessKind, writer: Option<&str>) -> Access {
        Access {
            submodel: submodel.to_string(),
            variable: variable.to_string(),
            kind,
            phase: Phase::Coupled,
            writer: writer.map(str::to_string),
        }
    }

    #[test]
    fn test_edges_follow_reads() {
        let log = vec![
            access("kinetics", "eta", AccessKind::Write, None),
            access("conductivity", "eta", AccessKind::Read, Some("kinetics")),
            access("conductivity", "eta", AccessKind::Read, Some("kinetics")),
            access("conductivity", "phi_e", AccessKind::Write, None),
        ];
        let report = DependencyReport::from_access_log(["kinetics", "conductivity", "idle"], &log);
        assert_eq!(report.dependencies_of("conductivity"), vec!["kinetics"]);
        assert_eq!(report.dependents_of("kinetics"), vec!["conductivity"]);
        assert!(report.dependencies_of("idle").is_empty());
        assert_eq!(report.edge_count(), 1);
        assert!(!report.has_cycles());
        assert!(report.check_stale_reads().is_ok());

        let dot = report.to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("eta"));
    }

    #[test]
    fn test_overwrite_after_read_is_stale() {
        let log = vec![
            access("a", "v", AccessKind::Write, None),
            access("b", "v", AccessKind::Read, Some("a")),
            access("c", "v", AccessKind::Write, None),
        ];
        let report = DependencyReport::from_access_log(["a", "b", "c"], &log);
        let err = report.check_stale_reads().unwrap_err();
        assert_eq!(
            err,
            ModelError::OrderingViolation { reader: "b".into(), writer: "c".into(), variable: "v".into() }
        );
    }

    #[test]
    fn test_self_update_is_not_stale() {
        let log = vec![
            access("a", "v", AccessKind::Read, None),
            access("a", "v", AccessKind::Write, None),
        ];
        let report = DependencyReport::from_access_log(["a"], &log);
        assert!(report.stale_reads().is_empty());
    }
}
