//! # Dependency Graph
//!
//! The graph of discovered manifests. Nodes are kept in discovery order and
//! indexed by id; edges are kept in the order they were emitted.
//!
//! Edges point from the **referenced** node to the **referencing** node: an
//! overlay that lists `../base` in its `resources` produces the edge
//! `base -> overlay`, read as "base is used by overlay".
//!
//! - [`builder`] resolves manifest references into edges.
//! - [`cycles`] reports cycles over the assembled graph.

pub mod builder;
pub mod cycles;

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::node::ManifestNode;

pub use builder::{build_graph, GraphBuild, GraphBuilder};
pub use cycles::detect_cycles;

/// How the referencing manifest pulls in the referenced one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Declared in `resources` or the deprecated `bases`.
    Resource,
    /// Declared in `components`.
    Component,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Resource => "resource",
            EdgeKind::Component => "component",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed dependency between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub id: String,
    /// Id of the referenced node.
    pub source: String,
    /// Id of the referencing node.
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
}

/// Which end of an edge is missing from the node set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Source,
    Target,
}

/// A non-fatal condition found while assembling a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GraphWarning {
    /// A local reference that resolved to no known node.
    #[serde(rename_all = "camelCase")]
    UnresolvedLocal {
        node_path: String,
        reference: String,
        resolved: String,
    },
    /// A remote reference that matched no node's source URL.
    #[serde(rename_all = "camelCase")]
    UnresolvedRemote {
        node_path: String,
        reference: String,
        normalized: String,
        known_remote_urls: Vec<String>,
    },
    /// An edge endpoint that names no node.
    #[serde(rename_all = "camelCase")]
    DanglingEdge {
        edge_id: String,
        endpoint: Endpoint,
        node_id: String,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::UnresolvedLocal {
                node_path,
                reference,
                resolved,
            } => write!(
                f,
                "{}: reference {:?} resolves to {:?}, which is not a scanned manifest",
                node_path, reference, resolved
            ),
            GraphWarning::UnresolvedRemote {
                node_path,
                reference,
                normalized,
                known_remote_urls,
            } => {
                write!(
                    f,
                    "{}: remote reference {:?} (normalized {:?}) matches no scanned source",
                    node_path, reference, normalized
                )?;
                if known_remote_urls.is_empty() {
                    write!(f, "; no remote sources are known")
                } else {
                    write!(f, "; known: {}", known_remote_urls.join(", "))
                }
            }
            GraphWarning::DanglingEdge {
                edge_id,
                endpoint,
                node_id,
            } => {
                let end = match endpoint {
                    Endpoint::Source => "source",
                    Endpoint::Target => "target",
                };
                write!(f, "edge {} has unknown {} node {}", edge_id, end, node_id)
            }
        }
    }
}

/// Immutable result of one graph build.
///
/// Nodes and connected edges live in a petgraph [`DiGraph`]; node indices
/// follow discovery order and edge indices follow emission order. Edges with
/// an endpoint outside the node set cannot be stored there and are kept
/// aside for integrity reporting.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    root_path: String,
    graph: DiGraph<ManifestNode, DependencyEdge>,
    index: HashMap<String, NodeIndex>,
    dangling: Vec<DependencyEdge>,
}

impl DependencyGraph {
    /// Assemble a graph from its parts. When two nodes share an id the first
    /// one is indexed.
    pub fn from_parts(
        nodes: Vec<ManifestNode>,
        edges: Vec<DependencyEdge>,
        root_path: impl Into<String>,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let id = node.id.clone();
            let position = graph.add_node(node);
            index.entry(id).or_insert(position);
        }

        let mut dangling = Vec::new();
        for edge in edges {
            match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, edge);
                }
                _ => dangling.push(edge),
            }
        }

        Self {
            root_path: root_path.into(),
            graph,
            index,
            dangling,
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// The underlying petgraph graph.
    pub fn inner(&self) -> &DiGraph<ManifestNode, DependencyEdge> {
        &self.graph
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &ManifestNode> + '_ {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    /// Connected edges in emission order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &DependencyEdge> + '_ {
        self.graph.raw_edges().iter().map(|edge| &edge.weight)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&ManifestNode> {
        self.node_index(id).map(|position| &self.graph[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Whether both endpoints of `edge` exist.
    pub fn is_connected(&self, edge: &DependencyEdge) -> bool {
        self.contains(&edge.source) && self.contains(&edge.target)
    }

    /// Edges leaving `position`, in emission order.
    fn outgoing_edges(&self, position: NodeIndex) -> Vec<EdgeReference<'_, DependencyEdge>> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(position, Direction::Outgoing)
            .collect();
        edges.sort_by_key(|edge| edge.id());
        edges
    }

    /// Edges leaving `id`, i.e. edges whose referenced node is `id`.
    pub fn outgoing(&self, id: &str) -> Vec<&DependencyEdge> {
        match self.node_index(id) {
            Some(position) => self
                .outgoing_edges(position)
                .into_iter()
                .map(|edge| &self.graph[edge.id()])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Nodes referencing `position`, following edges in emission order.
    pub fn successors(&self, position: NodeIndex) -> Vec<NodeIndex> {
        self.outgoing_edges(position)
            .into_iter()
            .map(|edge| edge.target())
            .collect()
    }

    /// Edges left out of the graph because an endpoint names no node.
    pub fn dangling_edges(&self) -> &[DependencyEdge] {
        &self.dangling
    }

    /// Every edge endpoint that names no node.
    pub fn dangling_endpoints(&self) -> Vec<GraphWarning> {
        let mut warnings = Vec::new();
        for edge in &self.dangling {
            for (endpoint, node_id) in [
                (Endpoint::Source, &edge.source),
                (Endpoint::Target, &edge.target),
            ] {
                if !self.contains(node_id) {
                    warnings.push(GraphWarning::DanglingEdge {
                        edge_id: edge.id.clone(),
                        endpoint,
                        node_id: node_id.clone(),
                    });
                }
            }
        }
        warnings
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.root_path == other.root_path
            && self.nodes().eq(other.nodes())
            && self.edges().eq(other.edges())
            && self.dangling == other.dangling
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let nodes: Vec<&ManifestNode> = self.nodes().collect();
        let edges: Vec<&DependencyEdge> = self.edges().collect();
        let mut state = serializer.serialize_struct("DependencyGraph", 3)?;
        state.serialize_field("rootPath", &self.root_path)?;
        state.serialize_field("nodes", &nodes)?;
        state.serialize_field("edges", &edges)?;
        state.end()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::manifest::Kustomization;
    use crate::node::classify;

    pub fn node(id: &str, path: &str) -> ManifestNode {
        ManifestNode {
            id: id.to_string(),
            path: path.to_string(),
            kind: classify(path),
            document: Kustomization::default(),
            is_remote: false,
            remote_source_url: None,
        }
    }

    pub fn edge(id: &str, source: &str, target: &str) -> DependencyEdge {
        DependencyEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Resource,
            label: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{edge, node};
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let graph = DependencyGraph::from_parts(vec![node("a", "base"), node("b", "overlay")], vec![], "base");
        assert_eq!(graph.node("b").map(|n| n.path.as_str()), Some("overlay"));
        assert!(graph.node("c").is_none());
        assert_eq!(graph.root_path(), "base");
    }

    #[test]
    fn test_duplicate_ids_index_first_node() {
        let graph = DependencyGraph::from_parts(vec![node("a", "first"), node("a", "second")], vec![], "first");
        assert_eq!(graph.node("a").map(|n| n.path.as_str()), Some("first"));
    }

    #[test]
    fn test_dangling_endpoints_are_reported() {
        let graph = DependencyGraph::from_parts(
            vec![node("a", "base")],
            vec![edge("e0", "a", "ghost"), edge("e1", "a", "a")],
            "base",
        );
        assert_eq!(
            graph.dangling_endpoints(),
            vec![GraphWarning::DanglingEdge {
                edge_id: "e0".to_string(),
                endpoint: Endpoint::Target,
                node_id: "ghost".to_string(),
            }]
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dangling_edges().len(), 1);
        assert!(!graph.is_connected(&graph.dangling_edges()[0]));
    }

    #[test]
    fn test_outgoing_follows_source() {
        let graph = DependencyGraph::from_parts(
            vec![node("a", "base"), node("b", "x"), node("c", "y")],
            vec![edge("e0", "a", "b"), edge("e1", "b", "c"), edge("e2", "a", "c")],
            "base",
        );
        let ids: Vec<&str> = graph.outgoing("a").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e0", "e2"]);
        assert!(graph.outgoing("ghost").is_empty());

        let a = graph.node_index("a").unwrap();
        let targets: Vec<&str> = graph
            .successors(a)
            .into_iter()
            .map(|position| graph.inner()[position].id.as_str())
            .collect();
        assert_eq!(targets, vec!["b", "c"]);
    }

    #[test]
    fn test_nodes_and_edges_keep_insertion_order() {
        let graph = DependencyGraph::from_parts(
            vec![node("n2", "z"), node("n0", "a"), node("n1", "m")],
            vec![edge("e1", "n0", "n1"), edge("e0", "n2", "n0")],
            "z",
        );
        let nodes: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        let edges: Vec<&str> = graph.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(nodes, vec!["n2", "n0", "n1"]);
        assert_eq!(edges, vec!["e1", "e0"]);
    }

    #[test]
    fn test_serializes_root_nodes_and_edges() {
        let graph = DependencyGraph::from_parts(
            vec![node("a", "base"), node("b", "overlay")],
            vec![edge("e0", "a", "b"), edge("e1", "a", "ghost")],
            "base",
        );
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["rootPath"], "base");
        assert_eq!(json["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["edges"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["edges"][0]["source"], "a");
    }

    #[test]
    fn test_warning_display() {
        let warning = GraphWarning::UnresolvedRemote {
            node_path: "overlays/prod".to_string(),
            reference: "https://github.com/a/b?ref=v1".to_string(),
            normalized: "https://github.com/a/b?ref=v1".to_string(),
            known_remote_urls: vec![],
        };
        assert!(warning.to_string().contains("no remote sources are known"));
    }
}
