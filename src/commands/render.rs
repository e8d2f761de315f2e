//! Renderers for scan reports: a plain text summary, the JSON document
//! consumed by graph viewers, and an ASCII dependency tree.

use std::borrow::Cow;
use std::collections::HashSet;

use anyhow::Result;
use ptree::TreeItem;
use serde::Serialize;

use kustomap::disambiguate::Resolution;
use kustomap::graph::DependencyGraph;
use kustomap::output::{kind_label, marker, Marker, OutputConfig};
use kustomap::phases::{ScanReport, ScanWarning};

/// JSON shape: `{rootPath, nodes, edges, cycles, warnings, resolution?}`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(flatten)]
    graph: &'a DependencyGraph,
    cycles: &'a [Vec<String>],
    warnings: &'a [ScanWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a Resolution>,
}

pub fn json(report: &ScanReport) -> Result<String> {
    let document = JsonReport {
        graph: &report.graph,
        cycles: &report.cycles,
        warnings: &report.warnings,
        resolution: report.resolution.as_ref(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn text(report: &ScanReport, output: &OutputConfig) -> String {
    let graph = &report.graph;
    let path_of = |id: &str| graph.node(id).map_or_else(|| id.to_string(), |n| n.path.clone());
    let mut lines = Vec::new();

    if let Some(resolution) = &report.resolution {
        lines.push(format!("Source: {}", resolution.coordinate));
    }
    lines.push(format!("Root: {}", graph.root_path()));
    lines.push(String::new());

    lines.push(format!("Manifests ({}):", graph.node_count()));
    lines.extend(
        graph
            .nodes()
            .map(|node| format!("  {} {}", kind_label(output, node.kind), node.path)),
    );

    lines.push(String::new());
    lines.push(format!("References ({}):", graph.edge_count()));
    lines.extend(graph.edges().map(|edge| {
        format!(
            "  {} -> {} ({}, via {})",
            path_of(&edge.target),
            path_of(&edge.source),
            edge.kind.as_str(),
            edge.label
        )
    }));

    let cycles = report.cycle_paths();
    if !cycles.is_empty() {
        lines.push(String::new());
        lines.push(format!("Cycles ({}):", cycles.len()));
        for cycle in &cycles {
            lines.push(format!("  {} {}", marker(output, Marker::Cycle), cycle_line(cycle)));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `a -> b -> a`
pub fn cycle_line(paths: &[String]) -> String {
    let mut line = paths.join(" -> ");
    if let Some(first) = paths.first() {
        line.push_str(" -> ");
        line.push_str(first);
    }
    line
}

/// Render each top-level manifest with the manifests it references beneath
/// it. A reference back onto the current branch is shown once and marked.
pub fn tree(report: &ScanReport) -> Result<String> {
    let root = TreeNode::from_graph(&report.graph);
    let mut buffer = Vec::new();
    ptree::write_tree(&root, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn from_graph(graph: &DependencyGraph) -> Self {
        let referenced: HashSet<&str> = graph.edges().map(|e| e.source.as_str()).collect();
        let mut shown: HashSet<String> = HashSet::new();
        let mut children = Vec::new();

        let tops = graph.nodes().filter(|n| !referenced.contains(n.id.as_str()));
        for node in tops {
            children.push(Self::branch(graph, &node.id, &mut Vec::new(), &mut shown));
        }
        // Manifests only reachable through a cycle have no top-level entry.
        for node in graph.nodes() {
            if !shown.contains(&node.id) {
                children.push(Self::branch(graph, &node.id, &mut Vec::new(), &mut shown));
            }
        }

        TreeNode {
            label: graph.root_path().to_string(),
            children,
        }
    }

    fn branch(
        graph: &DependencyGraph,
        id: &str,
        stack: &mut Vec<String>,
        shown: &mut HashSet<String>,
    ) -> Self {
        let label = match graph.node(id) {
            Some(node) => format!("{} [{}]", node.path, node.kind),
            None => id.to_string(),
        };
        if stack.iter().any(|s| s == id) {
            return TreeNode {
                label: format!("{} (cycle)", label),
                children: Vec::new(),
            };
        }

        shown.insert(id.to_string());
        stack.push(id.to_string());
        let children = graph
            .edges()
            .filter(|edge| edge.target == id)
            .map(|edge| Self::branch(graph, &edge.source, stack, shown))
            .collect();
        stack.pop();

        TreeNode { label, children }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kustomap::local::LocalManifest;
    use kustomap::config::{Credentials, Settings};
    use kustomap::phases::Scanner;

    fn report(entries: &[(&str, &str)]) -> ScanReport {
        let mut scanner = Scanner::new(Settings::default(), Credentials::default()).unwrap();
        scanner
            .scan_entries(
                entries
                    .iter()
                    .map(|(path, text)| LocalManifest::new(*path, *text))
                    .collect(),
                "test",
            )
            .unwrap()
    }

    fn shop() -> ScanReport {
        report(&[
            ("base", "resources: [deployment.yaml]"),
            ("lib/components/tls", "kind: Component"),
            (
                "overlays/prod",
                "resources: [../../base]\ncomponents: [../../lib/components/tls]",
            ),
        ])
    }

    #[test]
    fn test_text_lists_nodes_and_references() {
        let text = text(&shop(), &OutputConfig { use_color: false });
        assert!(text.contains("Root: base"));
        assert!(text.contains("[component] lib/components/tls"));
        assert!(text.contains("overlays/prod -> base (resource, via ../../base)"));
        assert!(!text.contains("Cycles"));
        assert!(text.starts_with("Root: base\n\nManifests (3):\n"));
        assert!(text.ends_with("(component, via ../../lib/components/tls)\n"));
    }

    #[test]
    fn test_json_has_graph_fields_at_top_level() {
        let value: serde_json::Value = serde_json::from_str(&json(&shop()).unwrap()).unwrap();
        assert_eq!(value["rootPath"], "base");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"].as_array().unwrap().len(), 2);
        assert_eq!(value["cycles"].as_array().unwrap().len(), 0);
        assert!(value.get("resolution").is_none());
    }

    #[test]
    fn test_tree_nests_references_under_overlay() {
        let rendered = tree(&shop()).unwrap();
        let overlay = rendered.find("overlays/prod [overlay]").unwrap();
        let base = rendered.find("base [base]").unwrap();
        assert!(overlay < base);
        assert_eq!(rendered.matches("base [base]").count(), 1);
    }

    #[test]
    fn test_tree_marks_cycles() {
        let cyclic = report(&[("a", "resources: [../b]"), ("b", "resources: [../a]")]);
        let rendered = tree(&cyclic).unwrap();
        assert!(rendered.contains("(cycle)"));

        let text = text(&cyclic, &OutputConfig { use_color: false });
        assert!(text.contains("cycle: a -> b -> a"));
    }

    #[test]
    fn test_cycle_line_closes_the_loop() {
        let paths = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle_line(&paths), "a -> b -> a");
        assert_eq!(cycle_line(&[]), "");
    }
}
