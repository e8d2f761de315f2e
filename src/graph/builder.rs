//! Dependency graph builder: resolves every reference field of every node
//! against the node set and emits typed edges.

use std::collections::HashMap;

use log::{debug, error, info, warn};

use super::{DependencyEdge, DependencyGraph, EdgeKind, GraphWarning};
use crate::manifest::ReferenceField;
use crate::node::ManifestNode;
use crate::path;

/// A built graph and the warnings raised while building it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphBuild {
    pub graph: DependencyGraph,
    pub warnings: Vec<GraphWarning>,
}

/// Builds graphs, assigning edge ids that are never reused by this builder.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    edge_counter: usize,
}

/// Lookup tables over the node set; the first node in input order wins.
struct NodeLookup<'a> {
    by_path: HashMap<String, &'a ManifestNode>,
    by_remote_url: HashMap<String, &'a ManifestNode>,
    known_remote_urls: Vec<String>,
}

impl<'a> NodeLookup<'a> {
    fn new(nodes: &'a [ManifestNode]) -> Self {
        let mut by_path = HashMap::new();
        let mut by_remote_url = HashMap::new();
        let mut known_remote_urls = Vec::new();

        for node in nodes {
            by_path
                .entry(path::normalize_display_path(&node.path))
                .or_insert(node);
            if let Some(url) = &node.remote_source_url {
                let normalized = path::normalize_remote_url(url);
                if !known_remote_urls.contains(&normalized) {
                    known_remote_urls.push(normalized.clone());
                }
                by_remote_url.entry(normalized).or_insert(node);
            }
        }

        Self {
            by_path,
            by_remote_url,
            known_remote_urls,
        }
    }
}

fn edge_kind(field: ReferenceField) -> EdgeKind {
    match field {
        ReferenceField::Resources | ReferenceField::Bases => EdgeKind::Resource,
        ReferenceField::Components => EdgeKind::Component,
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_edge_id(&mut self) -> String {
        let id = format!("edge-{}", self.edge_counter);
        self.edge_counter += 1;
        id
    }

    /// Build the graph for `nodes`, which must be in discovery order.
    pub fn build(&mut self, nodes: Vec<ManifestNode>) -> GraphBuild {
        info!("Building dependency graph over {} node(s)", nodes.len());
        let mut edges = Vec::new();
        let mut warnings = Vec::new();

        {
            let index = NodeLookup::new(&nodes);
            for node in &nodes {
                self.edges_for_node(node, &index, &mut edges, &mut warnings);
            }
        }
        info!("Created {} edge(s)", edges.len());

        let root_path = nodes.first().map(|n| n.path.clone()).unwrap_or_default();
        let graph = DependencyGraph::from_parts(nodes, edges, root_path);

        for dangling in graph.dangling_endpoints() {
            error!("Graph integrity fault: {}", dangling);
            warnings.push(dangling);
        }

        GraphBuild { graph, warnings }
    }

    fn edges_for_node(
        &mut self,
        node: &ManifestNode,
        index: &NodeLookup<'_>,
        edges: &mut Vec<DependencyEdge>,
        warnings: &mut Vec<GraphWarning>,
    ) {
        debug!("Resolving references of {} ({})", node.id, node.path);

        for (field, reference) in node.document.references() {
            if field != ReferenceField::Components && path::is_plain_yaml_file(reference) {
                debug!("  skipping plain resource file {}", reference);
                continue;
            }

            let resolved = if path::is_remote_reference(reference) {
                self.resolve_remote(node, reference, index, warnings)
            } else {
                self.resolve_local(node, reference, index, warnings)
            };

            if let Some((target, label)) = resolved {
                let edge = DependencyEdge {
                    id: self.next_edge_id(),
                    source: target.id.clone(),
                    target: node.id.clone(),
                    kind: edge_kind(field),
                    label,
                };
                debug!(
                    "  {} -> {} ({} {:?})",
                    target.path, node.path, edge.kind, edge.label
                );
                edges.push(edge);
            }
        }
    }

    fn resolve_remote<'a>(
        &self,
        node: &ManifestNode,
        reference: &str,
        index: &NodeLookup<'a>,
        warnings: &mut Vec<GraphWarning>,
    ) -> Option<(&'a ManifestNode, String)> {
        let normalized = path::normalize_remote_url(reference);
        match index.by_remote_url.get(&normalized) {
            Some(target) => Some((*target, path::remote_label(reference))),
            None => {
                warn!(
                    "{}: no scanned source matches remote reference {} (normalized {}); known remote sources: [{}]",
                    node.path,
                    reference,
                    normalized,
                    index.known_remote_urls.join(", ")
                );
                warnings.push(GraphWarning::UnresolvedRemote {
                    node_path: node.path.clone(),
                    reference: reference.to_string(),
                    normalized,
                    known_remote_urls: index.known_remote_urls.clone(),
                });
                None
            }
        }
    }

    fn resolve_local<'a>(
        &self,
        node: &ManifestNode,
        reference: &str,
        index: &NodeLookup<'a>,
        warnings: &mut Vec<GraphWarning>,
    ) -> Option<(&'a ManifestNode, String)> {
        let mut resolved = path::resolve_relative(&node.path, reference);
        // `../base/kustomization.yaml` names the same node as `../base`.
        if path::is_manifest_file_name(path::file_name(&resolved)) {
            resolved = match path::manifest_dir(&resolved) {
                "" => ".".to_string(),
                dir => dir.to_string(),
            };
        }

        match index.by_path.get(&resolved) {
            Some(target) => Some((*target, reference.to_string())),
            None => {
                warn!(
                    "{}: local reference {} resolves to {}, which is not a scanned manifest",
                    node.path, reference, resolved
                );
                warnings.push(GraphWarning::UnresolvedLocal {
                    node_path: node.path.clone(),
                    reference: reference.to_string(),
                    resolved,
                });
                None
            }
        }
    }
}

/// Build a graph with a fresh [`GraphBuilder`].
pub fn build_graph(nodes: Vec<ManifestNode>) -> GraphBuild {
    GraphBuilder::new().build(nodes)
}
