//! Import resolution helpers shared by the language adapters.
//!
//! Adapters recognize their own import syntax; this module turns the
//! extracted module references into canonical paths on disk. A reference
//! with no candidate file is dropped silently, since most imports name
//! third-party packages outside the project.

pub mod stdlib;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::types::SourceFile;

pub use stdlib::{DependencyType, StandardLibrary};

/// Accumulates resolved imports for one file.
///
/// Never yields the file itself and never yields duplicates. Order is the
/// order in which imports were resolved.
#[derive(Debug)]
pub struct ImportResolver {
    origin: PathBuf,
    dir: PathBuf,
    seen: HashSet<PathBuf>,
    resolved: Vec<PathBuf>,
}

impl ImportResolver {
    pub fn new(file: &SourceFile) -> Self {
        Self::for_path(&file.path)
    }

    pub fn for_path(path: &Path) -> Self {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            origin: path.to_path_buf(),
            dir,
            seen: HashSet::new(),
            resolved: Vec::new(),
        }
    }

    /// Directory of the importing file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record an already resolved path.
    pub fn add(&mut self, path: PathBuf) -> bool {
        let path = canonical(&path).unwrap_or(path);
        if path == self.origin || !self.seen.insert(path.clone()) {
            return false;
        }
        trace!(from = %self.origin.display(), to = %path.display(), "Resolved import");
        self.resolved.push(path);
        true
    }

    /// Resolve the first existing candidate relative to the importing file.
    pub fn resolve<I, P>(&mut self, candidates: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        match resolve_relative(&self.dir, candidates) {
            Some(path) => self.add(path),
            None => false,
        }
    }

    /// Resolve the first existing candidate relative to `base`.
    pub fn resolve_from<I, P>(&mut self, base: &Path, candidates: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        match resolve_relative(base, candidates) {
            Some(path) => self.add(path),
            None => false,
        }
    }

    /// Add every same-directory file with one of the given extensions.
    pub fn add_siblings(&mut self, extensions: &[&str]) {
        for path in sibling_files(&self.origin, extensions) {
            self.add(path);
        }
    }

    pub fn finish(self) -> Vec<PathBuf> {
        self.resolved
    }
}

/// Return the first candidate (joined onto `dir`) that is an existing file.
pub fn resolve_relative<I, P>(dir: &Path, candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    candidates
        .into_iter()
        .map(|c| dir.join(c.as_ref()))
        .find(|p| p.is_file())
        .map(|p| canonical(&p).unwrap_or(p))
}

/// Files in the same directory as `path` with one of `extensions`, sorted.
/// The file itself is excluded.
pub fn sibling_files(path: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let Some(dir) = path.parent() else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.as_path() != path)
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.contains(&e))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// First file with extension `ext` in `dir`, in lexicographic order.
pub fn first_file_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    files.sort();
    files.into_iter().next()
}

/// Read a literal that starts with `'`, `"` or a backtick.
pub fn extract_quoted(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| matches!(c, '\'' | '"' | '`'))?;
    let rest = &text[1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

fn canonical(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_quoted() {
        assert_eq!(extract_quoted("'./util'"), Some("./util"));
        assert_eq!(extract_quoted(" \"lib.php\");"), Some("lib.php"));
        assert_eq!(extract_quoted("`tpl`"), Some("tpl"));
        assert_eq!(extract_quoted("util"), None);
        assert_eq!(extract_quoted("'open"), None);
    }

    #[test]
    fn test_resolver_dedups_and_skips_self() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.py"), "").unwrap();
        std::fs::write(root.join("b.py"), "").unwrap();

        let mut resolver = ImportResolver::for_path(&root.join("a.py"));
        assert!(resolver.resolve(["b.py"]));
        assert!(!resolver.resolve(["b.py"]));
        assert!(!resolver.resolve(["a.py"]));
        assert!(!resolver.resolve(["missing.py"]));

        assert_eq!(resolver.finish(), vec![root.join("b.py")]);
    }

    #[test]
    fn test_sibling_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for name in ["Zeta.java", "Main.java", "Alpha.java", "notes.txt"] {
            std::fs::write(root.join(name), "").unwrap();
        }

        let siblings = sibling_files(&root.join("Main.java"), &["java"]);
        assert_eq!(siblings, vec![root.join("Alpha.java"), root.join("Zeta.java")]);
    }
}
