//! Dependency-aware analysis pipeline.
//!
//! discovery → per-file indexing → symbol index → call graph →
//! entry points → reachability → assembly → collapse (or the single-file
//! filter when assembly fails).

pub mod analyzer;
pub mod assembler;
pub mod call_graph;
pub mod collapse;
pub mod discovery;
pub mod index;
pub mod reachability;
pub mod stats;

pub use analyzer::{distill, DependencyAnalyzer, DistillOutcome};
pub use assembler::assemble;
pub use call_graph::CallGraph;
pub use collapse::{collapse, filter_tree, IMPLEMENTATION_FORMAT};
pub use discovery::{discover, Discovery, IndexedFile};
pub use index::SymbolIndex;
pub use reachability::{mark_reachable, mark_tree_types, select_entry_points, Reachability, UsedSet};
pub use stats::{DistillStats, TokenCounter};
