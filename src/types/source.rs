//! Loaded source files.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::processing::Language;

/// A source file loaded once per analysis run.
///
/// The path is absolute and canonical. Byte offsets produced by the
/// indexers always refer to `content`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Detected language.
    pub language: Language,
    /// Decoded file content.
    #[serde(skip)]
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Language, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language,
            content: content.into(),
        }
    }

    /// Directory containing this file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File name without extension.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Length of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines in the content.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Build the fully-qualified name of a symbol declared in this file.
    pub fn fqn(&self, name: &str) -> String {
        fqn(&self.path, name)
    }
}

/// Fully-qualified name: `path::name`.
pub fn fqn(path: &Path, name: &str) -> String {
    format!("{}::{}", path.display(), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_and_stem() {
        let file = SourceFile::new("/src/app/Main.java", Language::Java, "class Main {}\n");
        assert_eq!(file.fqn("run"), "/src/app/Main.java::run");
        assert_eq!(file.stem(), "Main");
        assert_eq!(file.dir(), Path::new("/src/app"));
        assert_eq!(file.line_count(), 1);
    }
}
