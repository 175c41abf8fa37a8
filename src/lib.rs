//! Distiller Service Library
//!
//! Dependency-aware reachability distillation: starting from one source file,
//! discover the local files it imports, index their definitions, build an
//! approximate cross-file call graph and rebuild a minimal program that only
//! contains the code reachable from the file's entry points.

pub mod adapters;
pub mod analysis;
pub mod api;
pub mod ast_engine;
pub mod batch;
pub mod error;
pub mod imports;
pub mod ir;
pub mod jobs;
pub mod processing;
pub mod types;

pub use analysis::{DependencyAnalyzer, DistillOutcome};
pub use batch::{BatchConfig, BatchProcessor, BatchResult};
pub use error::{DistillError, Result};
pub use processing::Language;
pub use types::{DistillConfig, ServiceConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adapters::{adapter_for, LanguageAdapter};
    pub use crate::analysis::*;
    pub use crate::ir::{DistilledFile, Node, Visibility};
    pub use crate::processing::{FileLoader, Language};
    pub use crate::types::*;
}

/// Default maximum call-graph traversal depth
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default number of files indexed concurrently
pub const DEFAULT_INDEX_CONCURRENCY: usize = 8;

/// Maximum source file size read by the loader (10MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default number of distillation jobs processed concurrently
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3018;
