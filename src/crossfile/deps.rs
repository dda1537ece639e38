//! File dependency graph with cycle detection.
//!
//! Forward and reverse edges are kept together so dependents can be
//! answered without a scan. Cycle detection is a DFS that reports at most
//! one cycle per starting file; overlapping cycles through the same nodes
//! collapse into whichever is found first.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct GraphInner {
    forward: HashMap<String, HashSet<String>>,
    reverse: HashMap<String, HashSet<String>>,
}

#[derive(Default)]
pub struct DependencyGraph {
    inner: RwLock<GraphInner>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Records `from` depending on `to`. Both directions update together.
    /// Self-edges and empty endpoints are ignored.
    pub fn add_dependency(&self, from: &str, to: &str) {
        if from == to || from.is_empty() || to.is_empty() {
            return;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .forward
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        inner
            .reverse
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    pub fn dependencies_of(&self, file: &str) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut deps: Vec<String> = inner
            .forward
            .get(file)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    pub fn dependents_of(&self, file: &str) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut deps: Vec<String> = inner
            .reverse
            .get(file)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    pub fn edge_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.forward.values().map(HashSet::len).sum()
    }

    /// Import cycles, at most one per DFS root, in deterministic order.
    /// Each cycle lists its files ending back at the start.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut roots: Vec<&String> = inner.forward.keys().collect();
        roots.sort();

        let mut cycles = Vec::new();
        let mut seen_cycles: HashSet<Vec<String>> = HashSet::new();
        for root in roots {
            let mut path: Vec<String> = Vec::new();
            let mut on_path: HashSet<String> = HashSet::new();
            if let Some(cycle) = dfs_cycle(&inner.forward, root, &mut path, &mut on_path) {
                // The same loop is reachable from every node on it.
                let mut canonical = cycle[..cycle.len() - 1].to_vec();
                canonical.sort();
                if seen_cycles.insert(canonical) {
                    cycles.push(cycle);
                }
            }
        }
        cycles
    }
}

fn dfs_cycle(
    forward: &HashMap<String, HashSet<String>>,
    node: &str,
    path: &mut Vec<String>,
    on_path: &mut HashSet<String>,
) -> Option<Vec<String>> {
    if on_path.contains(node) {
        let start = path.iter().position(|n| n == node)?;
        let mut cycle = path[start..].to_vec();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    path.push(node.to_string());
    on_path.insert(node.to_string());

    if let Some(next) = forward.get(node) {
        let mut ordered: Vec<&String> = next.iter().collect();
        ordered.sort();
        for neighbor in ordered {
            if let Some(cycle) = dfs_cycle(forward, neighbor, path, on_path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    on_path.remove(node);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_update_both_directions() {
        let graph = DependencyGraph::new();
        graph.add_dependency("a.go", "b.go");
        graph.add_dependency("a.go", "c.go");
        assert_eq!(graph.dependencies_of("a.go"), vec!["b.go", "c.go"]);
        assert_eq!(graph.dependents_of("b.go"), vec!["a.go"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn self_edges_are_ignored() {
        let graph = DependencyGraph::new();
        graph.add_dependency("a.go", "a.go");
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn two_file_cycle_is_found_once() {
        let graph = DependencyGraph::new();
        graph.add_dependency("a.js", "b.js");
        graph.add_dependency("b.js", "a.js");
        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 3);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = DependencyGraph::new();
        graph.add_dependency("a.py", "b.py");
        graph.add_dependency("b.py", "c.py");
        graph.add_dependency("a.py", "c.py");
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn three_file_cycle() {
        let graph = DependencyGraph::new();
        graph.add_dependency("a.ts", "b.ts");
        graph.add_dependency("b.ts", "c.ts");
        graph.add_dependency("c.ts", "a.ts");
        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 4);
    }
}
