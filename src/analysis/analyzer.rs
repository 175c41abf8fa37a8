//! Dependency-aware distillation of one file.
//!
//! Discovery and indexing run concurrently per file. Everything after the
//! index barrier (call graph, entry points, reachability, assembly) is
//! sequential and runs on the blocking pool.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::assembler::{assemble, is_retained};
use super::call_graph::CallGraph;
use super::collapse::{collapse, filter_tree};
use super::discovery::{discover, Discovery};
use super::index::SymbolIndex;
use super::reachability::{mark_reachable, mark_tree_types, select_entry_points, UsedSet};
use super::stats::{DistillStats, TokenCounter};
use crate::ast_engine::StructureParser;
use crate::error::Result;
use crate::ir::DistilledFile;
use crate::processing::FileLoader;
use crate::types::{DistillConfig, Project, SourceFile};

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct DistillOutcome {
    /// Distilled document, or the input tree when nothing was done.
    pub file: DistilledFile,
    /// Reconstructed project; `None` when assembly failed or was skipped.
    pub project: Option<Project>,
    pub entry_points: Vec<String>,
    pub used: UsedSet,
    /// Files discovered through imports, in discovery order.
    pub related_files: Vec<PathBuf>,
    /// Whether the single-file filter produced `file`.
    pub fell_back: bool,
    pub stats: DistillStats,
}

impl DistillOutcome {
    /// Outcome that returns `tree` untouched.
    pub fn unchanged(tree: &DistilledFile) -> Self {
        Self {
            file: tree.clone(),
            project: None,
            entry_points: Vec::new(),
            used: UsedSet::default(),
            related_files: Vec::new(),
            fell_back: false,
            stats: DistillStats::default(),
        }
    }
}

/// Runs the distillation pipeline with one configuration.
#[derive(Debug, Clone)]
pub struct DependencyAnalyzer {
    config: DistillConfig,
    loader: FileLoader,
    parser: StructureParser,
}

impl Default for DependencyAnalyzer {
    fn default() -> Self {
        Self::new(DistillConfig::default())
    }
}

impl DependencyAnalyzer {
    pub fn new(config: DistillConfig) -> Self {
        Self {
            loader: FileLoader::new(config.max_file_size),
            parser: StructureParser::new(),
            config,
        }
    }

    pub fn config(&self) -> &DistillConfig {
        &self.config
    }

    /// Distill the file `tree` was parsed from.
    ///
    /// Never fails: when the file cannot be read, or the mode is disabled,
    /// the input tree is returned unchanged.
    pub async fn analyze(&self, tree: &DistilledFile) -> DistillOutcome {
        if !self.config.enabled {
            debug!(file = %tree.path, "Dependency-aware mode disabled");
            return DistillOutcome::unchanged(tree);
        }

        match self.loader.load(Path::new(&tree.path)).await {
            Ok(main) => self.run(main, tree.clone()).await,
            Err(e) => {
                warn!(file = %tree.path, error = %e, "Cannot read analyzed file, keeping tree");
                DistillOutcome::unchanged(tree)
            }
        }
    }

    /// Load and parse `path`, then distill it.
    pub async fn analyze_path(&self, path: &Path) -> Result<DistillOutcome> {
        let main = self.loader.load(path).await?;
        let tree = self.parser.parse_source(&main);
        if !self.config.enabled {
            return Ok(DistillOutcome::unchanged(&tree));
        }
        Ok(self.run(main, tree).await)
    }

    async fn run(&self, main: SourceFile, tree: DistilledFile) -> DistillOutcome {
        let started = Instant::now();
        let deadline = self.config.deadline().map(|d| started + d);
        let main_path = main.path.clone();

        let discovery = discover(main, &self.loader, self.config.index_concurrency, deadline).await;
        debug!(
            file = %main_path.display(),
            files = discovery.len(),
            timed_out = discovery.timed_out,
            "Discovery complete"
        );

        let max_depth = self.config.max_depth;
        let original = tree.clone();
        let task_path = main_path.clone();
        let outcome =
            tokio::task::spawn_blocking(move || distill(discovery, tree, &task_path, max_depth)).await;

        match outcome {
            Ok(outcome) => {
                info!(
                    file = %main_path.display(),
                    files = outcome.stats.files,
                    used = outcome.stats.used_symbols,
                    fell_back = outcome.fell_back,
                    reduction = outcome.stats.reduction(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Distillation complete"
                );
                outcome
            }
            Err(e) => {
                warn!(file = %main_path.display(), error = %e, "Distillation task failed, keeping tree");
                DistillOutcome::unchanged(&original)
            }
        }
    }
}

/// Every stage after discovery: index, call graph, entry points,
/// reachability, then assembly or the single-file filter.
pub fn distill(discovery: Discovery, tree: DistilledFile, main: &Path, max_depth: usize) -> DistillOutcome {
    let index = SymbolIndex::build(
        discovery
            .files
            .values()
            .flat_map(|f| f.definitions.iter().cloned()),
    );
    let graph = CallGraph::build(&discovery.files, &index);

    let entry_points = select_entry_points(&tree, main, &index);
    let mut used = mark_reachable(&entry_points, main, &graph, &index, max_depth);
    mark_tree_types(&tree, main, &mut used);

    let counter = TokenCounter::global();
    let original_tokens: usize = discovery
        .files
        .values()
        .map(|f| counter.count(&f.source.content))
        .sum();

    let (file, project, fell_back, distilled_tokens) =
        match assemble(&discovery.files, &index, &used, &entry_points) {
            Ok(project) => {
                let file = collapse(&project, main, &tree);
                let tokens: usize = project.files.values().map(|f| counter.count(&f.content)).sum();
                (file, Some(project), false, tokens)
            }
            Err(e) => {
                warn!(file = %main.display(), error = %e, "Assembly failed, filtering declaration tree");
                let file = filter_tree(&tree, main, &used);
                let tokens: usize = match discovery.get(main) {
                    Some(indexed) => index
                        .definitions_in(main)
                        .filter(|d| is_retained(d, &used))
                        .filter_map(|d| indexed.source.content.get(d.start_byte..d.end_byte))
                        .map(|text| counter.count(text))
                        .sum(),
                    None => 0,
                };
                (file, None, true, tokens)
            }
        };

    let stats = DistillStats {
        files: discovery.len(),
        symbols: index.len(),
        edges: graph.edge_count(),
        used_symbols: used.len(),
        original_tokens,
        distilled_tokens,
        timed_out: discovery.timed_out,
    };

    DistillOutcome {
        file,
        project,
        entry_points,
        used,
        related_files: discovery.order.iter().skip(1).cloned().collect(),
        fell_back,
        stats,
    }
}
