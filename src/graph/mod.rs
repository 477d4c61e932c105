//! Dependency graph construction.
//!
//! Imports of every analysed file are resolved to module identifiers (or
//! external package names) and collected into a directed graph. Cycle
//! detection runs over the internal subgraph only.

pub mod cycles;
pub mod resolve;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analysis::{FileAnalysis, ImportEdge};

pub use cycles::{find_cycles, minimal_rotation};
pub use resolve::{module_id, ModuleIndex, Resolution};

/// A module identifier in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub is_external: bool,
}

/// Directed module dependency graph.
///
/// Nodes are sorted by id. Edges keep first-seen order; there is at most one
/// edge per (source, target) pair and never a self-edge. Cycles are listed
/// in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<ImportEdge>,
    pub cycles: Vec<Vec<String>>,
}

impl DependencyGraph {
    /// Modules `id` imports, in edge order.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source_module == id)
            .map(|e| e.target_reference.as_str())
            .collect()
    }

    /// Modules importing `id`, in edge order.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target_reference == id)
            .map(|e| e.source_module.as_str())
            .collect()
    }

    /// External package names, sorted.
    pub fn external_packages(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_external)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Edges between repository modules.
    pub fn internal_edges(&self) -> impl Iterator<Item = &ImportEdge> {
        self.edges.iter().filter(|e| !e.is_external)
    }

    pub fn internal_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_external).count()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Build the dependency graph of all analysed files.
pub fn build(files: &[FileAnalysis]) -> DependencyGraph {
    let index = ModuleIndex::from_files(files);

    let mut nodes: BTreeMap<String, bool> = BTreeMap::new();
    for file in files {
        nodes.insert(file.module.clone(), false);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut edges = Vec::new();

    for file in files {
        let Some(convention) = resolve::convention_of(file) else {
            continue;
        };
        for import in &file.imports {
            let (target, is_external) = match index.resolve(file, convention, &import.target_reference) {
                Resolution::Internal(id) => (id, false),
                Resolution::External(name) => (name, true),
                Resolution::Ambiguous => continue,
            };
            if target == file.module {
                continue;
            }
            if !seen.insert((file.module.clone(), target.clone())) {
                continue;
            }
            if is_external {
                nodes.entry(target.clone()).or_insert(true);
            }
            edges.push(ImportEdge {
                source_module: file.module.clone(),
                target_reference: target,
                is_external,
            });
        }
    }

    let internal: Vec<(&str, &str)> = edges
        .iter()
        .filter(|e| !e.is_external)
        .map(|e| (e.source_module.as_str(), e.target_reference.as_str()))
        .collect();
    let cycles = find_cycles(&internal);

    DependencyGraph {
        nodes: nodes
            .into_iter()
            .map(|(id, is_external)| GraphNode { id, is_external })
            .collect(),
        edges,
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_source;

    fn analyze(path: &str, language: &str, src: &str) -> FileAnalysis {
        analyze_source(path, language, src.as_bytes(), 10).expect("supported language")
    }

    #[test]
    fn test_build_python_ring() {
        let files = vec![
            analyze("a.py", "python", "import b\n"),
            analyze("b.py", "python", "from c import thing\n"),
            analyze("c.py", "python", "import a\nimport os\n"),
        ];
        let graph = build(&files);

        assert_eq!(graph.cycles.len(), 1);
        assert_eq!(graph.cycles[0].len(), 3);
        assert_eq!(minimal_rotation(&graph.cycles[0]), vec!["a", "b", "c"]);
        assert_eq!(graph.external_packages(), vec!["os"]);
        assert_eq!(graph.internal_node_count(), 3);
        assert_eq!(graph.dependencies_of("c"), vec!["a", "os"]);
        assert_eq!(graph.dependents_of("a"), vec!["c"]);
    }

    #[test]
    fn test_build_dedups_and_drops_self_edges() {
        let files = vec![
            analyze("pkg/__init__.py", "python", "from . import helpers\nfrom .helpers import x\nfrom . import other\n"),
            analyze("pkg/helpers.py", "python", "from pkg import helpers\n"),
        ];
        let graph = build(&files);

        // `from . import other` falls back to the package itself.
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source_module, "pkg");
        assert_eq!(graph.edges[0].target_reference, "pkg.helpers");
        assert!(!graph.has_cycles());
    }

    #[test]
    fn test_external_nodes_are_leaves() {
        let files = vec![analyze(
            "src/main.rs",
            "rust",
            "use serde::Serialize;\nuse std::fmt;\nmod cli;\n",
        )];
        let graph = build(&files);
        for ext in graph.external_packages() {
            assert!(graph.dependencies_of(ext).is_empty());
        }
        // The undeclared `cli` module falls back to the crate root: a self-edge.
        assert_eq!(graph.external_packages(), vec!["serde", "std"]);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_cross_language_files_keep_their_conventions() {
        let files = vec![
            analyze("web/app.ts", "typescript", "import { x } from './util';\n"),
            analyze("web/util.js", "javascript", "export const x = 1;\n"),
            analyze("tool/run.go", "go", "package main\nimport \"example.com/m/web\"\n"),
        ];
        let graph = build(&files);
        assert_eq!(graph.dependencies_of("web/app"), vec!["web/util"]);
        // Go resolves against directories, not JS modules.
        assert_eq!(graph.dependencies_of("tool"), vec!["example.com/m/web"]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = build(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.cycles.is_empty());
    }
}
