//! Cross-file call graph.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::discovery::IndexedFile;
use super::index::SymbolIndex;
use crate::adapters::{adapter_for, CallContext};
use crate::types::CallEdge;

/// Caller FQN to callee FQNs, in scan order. Duplicate edges are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl CallGraph {
    /// Scan every file for calls against the complete index. Files are
    /// scanned in lexicographic path order.
    pub fn build(files: &BTreeMap<PathBuf, IndexedFile>, index: &SymbolIndex) -> Self {
        let mut graph = CallGraph::default();

        for file in files.values() {
            let Some(adapter) = adapter_for(file.source.language) else {
                continue;
            };
            let ctx = CallContext {
                index,
                imports: &file.imports,
            };
            let edges = adapter.extract_calls(&file.source, &ctx);
            debug!(file = %file.path().display(), edges = edges.len(), "Extracted calls");
            for edge in edges {
                graph.add(edge);
            }
        }

        graph
    }

    pub fn add(&mut self, edge: CallEdge) {
        self.edges.entry(edge.caller).or_default().push(edge.callee);
    }

    /// Callees of `fqn` in scan order.
    pub fn callees(&self, fqn: &str) -> &[String] {
        self.edges.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of edges, counting duplicates.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Number of callers with at least one edge.
    pub fn caller_count(&self) -> usize {
        self.edges.len()
    }
}

impl FromIterator<CallEdge> for CallGraph {
    fn from_iter<I: IntoIterator<Item = CallEdge>>(iter: I) -> Self {
        let mut graph = CallGraph::default();
        for edge in iter {
            graph.add(edge);
        }
        graph
    }
}
