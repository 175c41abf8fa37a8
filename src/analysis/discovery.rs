//! Breadth-first file discovery and per-file indexing.
//!
//! Files are processed one BFS level at a time. Within a level, loading and
//! indexing run concurrently; results are put back into frontier order before
//! the next level is built, so the related set never depends on completion
//! order.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::adapters::adapter_for;
use crate::error::{DistillError, Result};
use crate::processing::FileLoader;
use crate::types::{SourceFile, SymbolDefinition};

/// A related file with its resolved imports and definitions.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub source: SourceFile,
    /// Resolved imports in import order.
    pub imports: Vec<PathBuf>,
    pub definitions: Vec<SymbolDefinition>,
}

impl IndexedFile {
    /// Run the file's language adapter. Files without an adapter contribute
    /// no imports and no definitions.
    pub fn index(source: SourceFile) -> Self {
        let (imports, definitions) = match adapter_for(source.language) {
            Some(adapter) => (adapter.extract_imports(&source), adapter.index_symbols(&source)),
            None => {
                debug!(
                    file = %source.path.display(),
                    language = %source.language,
                    "No adapter for language"
                );
                (Vec::new(), Vec::new())
            }
        };
        debug!(
            file = %source.path.display(),
            imports = imports.len(),
            symbols = definitions.len(),
            "Indexed file"
        );
        Self {
            source,
            imports,
            definitions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }
}

/// The related file set of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Indexed files keyed by canonical path.
    pub files: BTreeMap<PathBuf, IndexedFile>,
    /// Paths in discovery order, starting with the analyzed file.
    pub order: Vec<PathBuf>,
    /// Whether discovery stopped because the deadline passed.
    pub timed_out: bool,
}

impl Discovery {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&IndexedFile> {
        self.files.get(path)
    }

    fn push(&mut self, file: IndexedFile) {
        self.order.push(file.source.path.clone());
        self.files.insert(file.source.path.clone(), file);
    }
}

/// Index a file on the blocking pool.
async fn index_blocking(source: SourceFile) -> Result<IndexedFile> {
    let path = source.path.clone();
    tokio::task::spawn_blocking(move || IndexedFile::index(source))
        .await
        .map_err(|e| DistillError::Parse(format!("indexing {} failed: {}", path.display(), e)))
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.map_or(false, |d| Instant::now() >= d)
}

/// Discover and index every file reachable from `main` through imports.
///
/// Unreadable files are logged and left out. When `deadline` passes, files
/// not yet read are skipped and the result is marked as timed out.
pub async fn discover(
    main: SourceFile,
    loader: &FileLoader,
    concurrency: usize,
    deadline: Option<Instant>,
) -> Discovery {
    let mut discovery = Discovery::default();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    visited.insert(main.path.clone());

    let main_path = main.path.clone();
    let mut frontier: Vec<PathBuf> = match index_blocking(main).await {
        Ok(indexed) => {
            let next = unvisited(&indexed.imports, &mut visited);
            discovery.push(indexed);
            next
        }
        Err(e) => {
            warn!(file = %main_path.display(), error = %e, "Failed to index analyzed file");
            Vec::new()
        }
    };

    let mut level = 1usize;
    while !frontier.is_empty() {
        if expired(deadline) {
            warn!(pending = frontier.len(), "Discovery deadline exceeded");
            discovery.timed_out = true;
            break;
        }

        let mut results: Vec<(usize, Option<Result<IndexedFile>>)> =
            stream::iter(frontier.clone().into_iter().enumerate())
                .map(|(i, path)| async move {
                    if expired(deadline) {
                        return (i, None);
                    }
                    let result = match loader.load(&path).await {
                        Ok(source) => index_blocking(source).await,
                        Err(e) => Err(e),
                    };
                    (i, Some(result))
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;
        results.sort_by_key(|(i, _)| *i);

        let mut next = Vec::new();
        for (i, result) in results {
            match result {
                Some(Ok(indexed)) => {
                    next.extend(unvisited(&indexed.imports, &mut visited));
                    discovery.push(indexed);
                }
                Some(Err(e)) => {
                    warn!(file = %frontier[i].display(), error = %e, "Skipping related file");
                }
                None => discovery.timed_out = true,
            }
        }

        debug!(level, files = discovery.len(), next = next.len(), "Discovery level complete");
        frontier = next;
        level += 1;
    }

    discovery
}

fn unvisited(imports: &[PathBuf], visited: &mut HashSet<PathBuf>) -> Vec<PathBuf> {
    imports
        .iter()
        .filter(|p| visited.insert((*p).clone()))
        .cloned()
        .collect()
}
