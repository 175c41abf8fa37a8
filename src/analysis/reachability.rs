//! Entry-point selection and bounded call-graph traversal.
//!
//! The visited set is keyed by `(fqn, depth)`: a symbol reached again at a
//! different depth is expanded again. This keeps the depth bound exact along
//! every path at the cost of re-traversal on densely connected graphs.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::call_graph::CallGraph;
use super::index::SymbolIndex;
use crate::ir::{DistilledFile, Node};
use crate::types::{fqn, SymbolKind};

/// Names treated as constructors of the analyzed file.
const CONSTRUCTOR_NAMES: &[&str] = &["__init__", "__construct", "constructor"];

/// FQNs and bare type names marked reachable. Only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsedSet {
    names: BTreeSet<String>,
}

impl UsedSet {
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    pub fn is_subset(&self, other: &UsedSet) -> bool {
        self.names.is_subset(&other.names)
    }
}

impl<S: Into<String>> Extend<S> for UsedSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

fn is_main(name: &str) -> bool {
    name.eq_ignore_ascii_case("main")
}

fn is_entry_name(name: &str) -> bool {
    is_main(name) || CONSTRUCTOR_NAMES.contains(&name)
}

/// Choose entry-point FQNs for the analyzed file.
///
/// In priority order: functions named `main` or constructors in the
/// declaration tree; otherwise every exposed top-level function, exposed
/// class and exposed method of an exposed class;
/// otherwise indexed `main` functions of the file; otherwise every indexed
/// definition of the file.
pub fn select_entry_points(tree: &DistilledFile, main: &Path, index: &SymbolIndex) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();

    for node in &tree.children {
        match node {
            Node::Function { name, .. } if is_entry_name(name) => {
                entries.push(fqn(main, name));
            }
            Node::Class {
                name: class,
                children,
                ..
            } => {
                for child in children {
                    if let Node::Function { name, .. } = child {
                        if is_entry_name(name) {
                            entries.push(fqn(main, &format!("{}.{}", class, name)));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    if !entries.is_empty() {
        return entries;
    }

    for node in &tree.children {
        match node {
            Node::Function {
                name, visibility, ..
            } if visibility.is_exposed() => entries.push(fqn(main, name)),
            Node::Class {
                name: class,
                visibility,
                children,
                ..
            } if visibility.is_exposed() => {
                // Classes never call anything themselves; their exposed
                // methods carry the outgoing edges.
                entries.push(fqn(main, class));
                for child in children {
                    if let Node::Function {
                        name, visibility, ..
                    } = child
                    {
                        if visibility.is_exposed() {
                            entries.push(fqn(main, &format!("{}.{}", class, name)));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    if !entries.is_empty() {
        return entries;
    }

    let local: Vec<_> = index.definitions_in(main).collect();
    entries.extend(
        local
            .iter()
            .filter(|d| d.kind == SymbolKind::Function && is_main(d.short_name()))
            .map(|d| d.fqn.clone()),
    );
    if !entries.is_empty() {
        return entries;
    }

    local.iter().map(|d| d.fqn.clone()).collect()
}

/// Indexed FQNs an entry point stands for.
///
/// A `Class.method` entry from the declaration tree is not indexed under
/// that name; it also seeds `Class::method` or `method` of the same file.
fn expand_entry(entry: &str, main: &Path, index: &SymbolIndex) -> Vec<String> {
    let mut seeds = vec![entry.to_string()];
    if index.contains(entry) {
        return seeds;
    }

    let prefix = fqn(main, "");
    let Some(local) = entry.strip_prefix(&prefix) else {
        return seeds;
    };
    if let Some((class, method)) = local.rsplit_once('.') {
        let qualified = format!("{}::{}", class, method);
        if let Some(def) = index
            .lookup_in(main, &qualified)
            .or_else(|| index.lookup_in(main, method))
        {
            seeds.push(def.fqn.clone());
        }
    }
    seeds
}

/// Bounded traversal state for one run.
pub struct Reachability<'a> {
    graph: &'a CallGraph,
    index: &'a SymbolIndex,
    max_depth: usize,
    visited: HashSet<(String, usize)>,
    used: UsedSet,
}

impl<'a> Reachability<'a> {
    pub fn new(graph: &'a CallGraph, index: &'a SymbolIndex, max_depth: usize) -> Self {
        Self {
            graph,
            index,
            max_depth,
            visited: HashSet::new(),
            used: UsedSet::default(),
        }
    }

    /// Mark `entry` and everything reachable from it within the depth bound.
    pub fn visit(&mut self, entry: &str) {
        let mut stack: Vec<(String, usize)> = vec![(entry.to_string(), 0)];

        while let Some((current, depth)) = stack.pop() {
            if depth > self.max_depth || !self.visited.insert((current.clone(), depth)) {
                continue;
            }

            if let Some(def) = self.index.get(&current) {
                self.used.extend(def.signature_types.iter().cloned());
            }
            for callee in self.graph.callees(&current).iter().rev() {
                stack.push((callee.clone(), depth + 1));
            }
            self.used.insert(current);
        }
    }

    pub fn finish(self) -> UsedSet {
        self.used
    }
}

/// Traverse from every entry point and collect the used set.
pub fn mark_reachable(
    entries: &[String],
    main: &Path,
    graph: &CallGraph,
    index: &SymbolIndex,
    max_depth: usize,
) -> UsedSet {
    let mut reach = Reachability::new(graph, index, max_depth);
    for entry in entries {
        for seed in expand_entry(entry, main, index) {
            reach.visit(&seed);
        }
    }
    let used = reach.finish();
    debug!(entries = entries.len(), used = used.len(), max_depth, "Reachability complete");
    used
}

/// Add parameter and return types of used declarations of the analyzed
/// file as bare names.
pub fn mark_tree_types(tree: &DistilledFile, main: &Path, used: &mut UsedSet) {
    let mut types: Vec<String> = Vec::new();
    for node in &tree.children {
        match node {
            Node::Function { name, .. } if used.contains(&fqn(main, name)) => {
                types.extend(node.referenced_types());
            }
            Node::Class {
                name: class,
                children,
                ..
            } => {
                for child in children {
                    let Some(name) = child.name() else {
                        continue;
                    };
                    let key = fqn(main, &format!("{}.{}", class, name));
                    if used.contains(&key) {
                        types.extend(child.referenced_types());
                    }
                }
            }
            _ => {}
        }
    }
    used.extend(types);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Parameter, Visibility};
    use crate::processing::Language;
    use crate::types::{CallEdge, SymbolDefinition};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn def(file: &str, name: &str, types: &[&str]) -> SymbolDefinition {
        let path = PathBuf::from(file);
        SymbolDefinition {
            name: name.to_string(),
            fqn: fqn(&path, name),
            file_path: path,
            start_byte: 0,
            end_byte: 1,
            language: Language::Python,
            kind: SymbolKind::Function,
            signature_types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn graph(edges: &[(&str, &str)]) -> CallGraph {
        edges.iter().map(|(a, b)| CallEdge::new(*a, *b)).collect()
    }

    #[test]
    fn test_depth_zero_keeps_entry_only() {
        let index = SymbolIndex::build(vec![def("/a.py", "main", &[]), def("/a.py", "helper", &[])]);
        let graph = graph(&[("/a.py::main", "/a.py::helper")]);
        let entries = vec!["/a.py::main".to_string()];

        let used = mark_reachable(&entries, Path::new("/a.py"), &graph, &index, 0);
        assert_eq!(used.iter().collect::<Vec<_>>(), vec!["/a.py::main"]);

        let used = mark_reachable(&entries, Path::new("/a.py"), &graph, &index, 1);
        assert!(used.contains("/a.py::helper"));
    }

    #[test]
    fn test_cycle_terminates_and_is_monotonic() {
        let index = SymbolIndex::default();
        let graph = graph(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "d")]);
        let entries = vec!["a".to_string()];

        let mut previous = UsedSet::default();
        for depth in 0..6 {
            let used = mark_reachable(&entries, Path::new("/x"), &graph, &index, depth);
            assert!(used.contains("a"));
            assert!(previous.is_subset(&used));
            previous = used;
        }
        assert_eq!(previous.len(), 4);
    }

    #[test]
    fn test_signature_types_are_marked() {
        let index = SymbolIndex::build(vec![def("/a.py", "main", &["Config"])]);
        let used = mark_reachable(
            &["/a.py::main".to_string()],
            Path::new("/a.py"),
            &CallGraph::default(),
            &index,
            3,
        );
        assert!(used.contains("Config"));
    }

    #[test]
    fn test_entry_point_priority() {
        let main = Path::new("/p/app.py");
        let index = SymbolIndex::build(vec![def("/p/app.py", "run", &[]), def("/p/app.py", "Main", &[])]);

        let tree = DistilledFile::new("/p/app.py", Language::Python).with_children(vec![
            Node::function("run", Visibility::Public),
            Node::function("_private", Visibility::Private),
            Node::function("main", Visibility::Public),
        ]);
        assert_eq!(select_entry_points(&tree, main, &index), vec!["/p/app.py::main"]);

        let tree = DistilledFile::new("/p/app.py", Language::Python).with_children(vec![
            Node::function("run", Visibility::Public),
            Node::function("_private", Visibility::Private),
        ]);
        assert_eq!(select_entry_points(&tree, main, &index), vec!["/p/app.py::run"]);

        // Nothing from the tree: indexed `main` (case-insensitive), then everything.
        let empty = DistilledFile::new("/p/app.py", Language::Python);
        assert_eq!(select_entry_points(&empty, main, &index), vec!["/p/app.py::Main"]);

        let index = SymbolIndex::build(vec![def("/p/app.py", "b", &[]), def("/p/app.py", "a", &[])]);
        assert_eq!(
            select_entry_points(&empty, main, &index),
            vec!["/p/app.py::a", "/p/app.py::b"]
        );
    }

    #[test]
    fn test_class_method_entries_expand() {
        let main = Path::new("/p/Main.java");
        let index = SymbolIndex::build(vec![def("/p/Main.java", "main", &[])]);
        let tree = DistilledFile::new("/p/Main.java", Language::Java).with_children(vec![Node::class(
            "Main",
            Visibility::Public,
            vec![Node::function("main", Visibility::Public)],
        )]);

        let entries = select_entry_points(&tree, main, &index);
        assert_eq!(entries, vec!["/p/Main.java::Main.main"]);

        let used = mark_reachable(&entries, main, &CallGraph::default(), &index, 2);
        assert!(used.contains("/p/Main.java::Main.main"));
        assert!(used.contains("/p/Main.java::main"));
    }

    #[test]
    fn test_exposed_class_methods_are_entries() {
        let main = Path::new("/p/svc.py");
        let index = SymbolIndex::build(vec![
            SymbolDefinition {
                kind: SymbolKind::Class,
                ..def("/p/svc.py", "Service", &[])
            },
            def("/p/svc.py", "run", &[]),
            def("/p/svc.py", "_reset", &[]),
            def("/p/helpers.py", "helper", &[]),
        ]);
        let graph = graph(&[("/p/svc.py::run", "/p/helpers.py::helper")]);
        let tree = DistilledFile::new("/p/svc.py", Language::Python).with_children(vec![Node::class(
            "Service",
            Visibility::Public,
            vec![
                Node::function("run", Visibility::Public),
                Node::function("_reset", Visibility::Private),
            ],
        )]);

        let entries = select_entry_points(&tree, main, &index);
        assert_eq!(entries, vec!["/p/svc.py::Service", "/p/svc.py::Service.run"]);

        let used = mark_reachable(&entries, main, &graph, &index, 3);
        assert_eq!(
            used.iter().collect::<Vec<_>>(),
            vec![
                "/p/helpers.py::helper",
                "/p/svc.py::Service",
                "/p/svc.py::Service.run",
                "/p/svc.py::run",
            ]
        );
    }

    #[test]
    fn test_tree_types_are_marked() {
        let main = Path::new("/p/app.py");
        let tree = DistilledFile::new("/p/app.py", Language::Python).with_children(vec![Node::Function {
            name: "main".to_string(),
            visibility: Visibility::Public,
            parameters: vec![Parameter {
                name: "cfg".to_string(),
                type_name: Some("Settings".to_string()),
            }],
            return_type: None,
            line_start: 1,
            line_end: 2,
        }]);
        let mut used = UsedSet::default();
        used.insert("/p/app.py::main");

        mark_tree_types(&tree, main, &mut used);
        assert!(used.contains("Settings"));
    }
}
