//! Error types for the distillation pipeline.
//!
//! Most of these never reach the caller of [`crate::analysis::DependencyAnalyzer`]:
//! the analyzer recovers locally and degrades to the best available output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, parsing or assembling sources.
#[derive(Error, Debug)]
pub enum DistillError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file rejected: {path}: {reason}")]
    FileRejected { path: PathBuf, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("assembly failed: {0}")]
    Assembly(String),
}

impl DistillError {
    /// Wrap an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DistillError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DistillError>;
