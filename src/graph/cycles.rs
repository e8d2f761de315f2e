//! Cycle detection over a built [`DependencyGraph`].
//!
//! Depth-first traversal of the petgraph graph with an explicit stack,
//! starting from each node in discovery order. Each node is expanded at most
//! once; an edge back to a node still on the stack closes a cycle, recorded
//! as the stack slice from that node through the current one. Dangling edges
//! never enter the petgraph graph, so they cannot close a cycle.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::NodeIndex;

use super::DependencyGraph;

/// Every cycle found, as node ids in traversal order. The first node is not
/// repeated at the end.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let inner = graph.inner();
    if !is_cyclic_directed(inner) {
        return Vec::new();
    }

    let successors: Vec<Vec<NodeIndex>> = inner
        .node_indices()
        .map(|position| graph.successors(position))
        .collect();

    let mut cycles = Vec::new();
    let mut visited = vec![false; inner.node_count()];
    let mut on_stack = vec![false; inner.node_count()];

    for start in inner.node_indices() {
        if visited[start.index()] {
            continue;
        }

        // (node, index of the next outgoing edge to follow)
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        visited[start.index()] = true;
        on_stack[start.index()] = true;

        while let Some(&(current, next)) = stack.last() {
            let Some(&target) = successors[current.index()].get(next) else {
                stack.pop();
                on_stack[current.index()] = false;
                continue;
            };

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            if !visited[target.index()] {
                visited[target.index()] = true;
                on_stack[target.index()] = true;
                stack.push((target, 0));
            } else if on_stack[target.index()] {
                if let Some(begin) = stack.iter().position(|&(position, _)| position == target) {
                    cycles.push(
                        stack[begin..]
                            .iter()
                            .map(|&(position, _)| inner[position].id.clone())
                            .collect(),
                    );
                }
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::{edge, node};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        DependencyGraph::from_parts(
            ids.iter().map(|id| node(id, id)).collect(),
            edges
                .iter()
                .enumerate()
                .map(|(i, (s, t))| edge(&format!("edge-{}", i), s, t))
                .collect(),
            ids.first().copied().unwrap_or_default(),
        )
    }

    #[test]
    fn test_three_node_cycle() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(detect_cycles(&g), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_acyclic_graph() {
        let g = graph(
            &["base", "web", "prod", "dev"],
            &[("base", "web"), ("web", "prod"), ("web", "dev"), ("base", "dev")],
        );
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_self_reference() {
        let g = graph(&["a"], &[("a", "a")]);
        assert_eq!(detect_cycles(&g), vec![vec!["a"]]);
    }

    #[test]
    fn test_cycle_entered_midway() {
        let g = graph(&["x", "a", "b"], &[("x", "a"), ("a", "b"), ("b", "a")]);
        assert_eq!(detect_cycles(&g), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_two_distinct_cycles() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")],
        );
        assert_eq!(detect_cycles(&g), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_finished_nodes_are_not_revisited() {
        // Diamond: d is reached twice but only expanded once.
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_cycle_follows_edge_emission_order() {
        // Both branches from a lead back to a; the first emitted edge is
        // walked first.
        let g = graph(
            &["a", "b", "c"],
            &[("a", "c"), ("a", "b"), ("b", "a"), ("c", "a")],
        );
        assert_eq!(detect_cycles(&g), vec![vec!["a", "c"], vec!["a", "b"]]);
    }

    #[test]
    fn test_dangling_edges_are_ignored() {
        let g = graph(&["a", "b"], &[("a", "ghost"), ("ghost", "a"), ("a", "b")]);
        assert!(detect_cycles(&g).is_empty());
    }
}
