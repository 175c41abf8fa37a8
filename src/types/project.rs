//! Reconstructed multi-file projects.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::CodeSnippet;
use crate::processing::Language;

/// One reconstructed file: its retained snippets and their concatenation.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledFile {
    pub path: PathBuf,
    pub language: Language,
    /// Retained snippets ordered by start offset.
    pub snippets: Vec<CodeSnippet>,
    /// Preamble plus snippet bodies joined by blank lines.
    pub content: String,
}

/// All reconstructed files of one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Project {
    pub files: BTreeMap<PathBuf, AssembledFile>,
    /// Entry-point FQNs that seeded the traversal.
    pub entry_points: Vec<String>,
}

impl Project {
    /// Total number of retained snippets.
    pub fn snippet_count(&self) -> usize {
        self.files.values().map(|f| f.snippets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.values().all(|f| f.content.is_empty())
    }
}
