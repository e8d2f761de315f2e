//! Phase 3: Assembly
//!
//! Builds the dependency graph from the parsed nodes and runs cycle
//! detection over it. Unresolved references, integrity faults and cycles are
//! reported as warnings, never as failures.

use log::{info, warn};

use super::{cycle_paths, ScanWarning};
use crate::graph::{detect_cycles, DependencyGraph, GraphBuilder};
use crate::node::ManifestNode;

/// An assembled graph with its cycles and assembly warnings
#[derive(Debug, Clone)]
pub struct Assembly {
    pub graph: DependencyGraph,
    pub cycles: Vec<Vec<String>>,
    pub warnings: Vec<ScanWarning>,
}

pub fn execute(nodes: Vec<ManifestNode>, builder: &mut GraphBuilder) -> Assembly {
    let build = builder.build(nodes);
    let mut warnings: Vec<ScanWarning> = build.warnings.into_iter().map(ScanWarning::Graph).collect();

    let cycles = detect_cycles(&build.graph);
    for paths in cycle_paths(&build.graph, &cycles) {
        warn!("Dependency cycle: {}", paths.join(" -> "));
        warnings.push(ScanWarning::Cycle { paths });
    }
    info!(
        "Assembled {} node(s), {} edge(s), {} cycle(s)",
        build.graph.node_count(),
        build.graph.edge_count(),
        cycles.len()
    );

    Assembly {
        graph: build.graph,
        cycles,
        warnings,
    }
}
