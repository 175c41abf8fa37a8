//! Global symbol index over every related file.
//!
//! Built once after all files are indexed and read-only afterwards. All maps
//! are ordered so resolution never depends on hash iteration order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{SymbolDefinition, SymbolKind};

/// Definitions keyed by FQN, plus per-file name tables.
#[derive(Debug, Default, Clone)]
pub struct SymbolIndex {
    definitions: BTreeMap<String, SymbolDefinition>,
    /// file -> local name -> FQN
    names: BTreeMap<PathBuf, BTreeMap<String, String>>,
    /// file -> last `::` segment -> FQN, for qualified names only
    short_names: BTreeMap<PathBuf, BTreeMap<String, String>>,
}

impl SymbolIndex {
    /// Build the index. A later definition with the same FQN replaces the
    /// earlier one.
    pub fn build<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = SymbolDefinition>,
    {
        let mut index = SymbolIndex::default();
        for def in definitions {
            index.insert(def);
        }
        index
    }

    fn insert(&mut self, def: SymbolDefinition) {
        self.names
            .entry(def.file_path.clone())
            .or_default()
            .insert(def.name.clone(), def.fqn.clone());

        let short = def.short_name();
        if short != def.name {
            self.short_names
                .entry(def.file_path.clone())
                .or_default()
                .entry(short.to_string())
                .or_insert_with(|| def.fqn.clone());
        }

        self.definitions.insert(def.fqn.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, fqn: &str) -> Option<&SymbolDefinition> {
        self.definitions.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.definitions.contains_key(fqn)
    }

    /// All definitions in FQN order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolDefinition> {
        self.definitions.values()
    }

    /// Indexed files in lexicographic order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.names.keys().map(PathBuf::as_path)
    }

    /// Definitions declared in `file`, ordered by name.
    pub fn definitions_in<'a>(&'a self, file: &Path) -> impl Iterator<Item = &'a SymbolDefinition> + 'a {
        self.names
            .get(file)
            .into_iter()
            .flat_map(|names| names.values())
            .filter_map(move |fqn| self.definitions.get(fqn))
    }

    /// Look up `name` in one file: exact name first, then short name.
    pub fn lookup_in(&self, file: &Path, name: &str) -> Option<&SymbolDefinition> {
        self.lookup_exact(file, name)
            .or_else(|| self.lookup_short(file, name))
    }

    fn lookup_exact(&self, file: &Path, name: &str) -> Option<&SymbolDefinition> {
        self.names
            .get(file)
            .and_then(|names| names.get(name))
            .and_then(|fqn| self.definitions.get(fqn))
    }

    fn lookup_short(&self, file: &Path, name: &str) -> Option<&SymbolDefinition> {
        self.short_names
            .get(file)
            .and_then(|names| names.get(name))
            .and_then(|fqn| self.definitions.get(fqn))
    }

    /// Files in resolution priority order: the current file, its imports in
    /// import order, then everything else lexicographically.
    fn priority<'a>(
        &'a self,
        current: &'a Path,
        imports: &'a [PathBuf],
    ) -> impl Iterator<Item = &'a Path> + 'a {
        std::iter::once(current)
            .chain(imports.iter().map(PathBuf::as_path))
            .chain(
                self.files()
                    .filter(move |f| *f != current && !imports.iter().any(|i| i.as_path() == *f)),
            )
    }

    /// Resolve a callable name seen in `current`.
    ///
    /// Exact names win over short-name aliases; within each pass files are
    /// tried in [priority](Self::priority) order.
    pub fn resolve(&self, name: &str, current: &Path, imports: &[PathBuf]) -> Option<&SymbolDefinition> {
        let callable = |d: &&SymbolDefinition| d.kind == SymbolKind::Function;
        self.priority(current, imports)
            .find_map(move |f| self.lookup_exact(f, name).filter(callable))
            .or_else(|| {
                self.priority(current, imports)
                    .find_map(move |f| self.lookup_short(f, name).filter(callable))
            })
    }

    /// First indexed file whose file name matches one of `file_names`, in
    /// candidate order, then priority order.
    pub fn find_file_named<'a>(
        &'a self,
        file_names: &[String],
        current: &'a Path,
        imports: &'a [PathBuf],
    ) -> Option<&'a Path> {
        file_names.iter().find_map(|wanted| {
            self.priority(current, imports).find(|f| {
                f.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n == wanted)
                    .unwrap_or(false)
            })
        })
    }

    /// Whether any file declares `name` (exact or short).
    pub fn declares_name(&self, name: &str) -> bool {
        self.names.values().any(|n| n.contains_key(name))
            || self.short_names.values().any(|n| n.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::Language;
    use crate::types::fqn;
    use pretty_assertions::assert_eq;

    fn def(file: &str, name: &str, start: usize) -> SymbolDefinition {
        let path = PathBuf::from(file);
        SymbolDefinition {
            name: name.to_string(),
            fqn: fqn(&path, name),
            file_path: path,
            start_byte: start,
            end_byte: start + 10,
            language: Language::Python,
            kind: SymbolKind::Function,
            signature_types: Vec::new(),
        }
    }

    #[test]
    fn test_resolution_priority() {
        let index = SymbolIndex::build(vec![
            def("/p/a.py", "main", 0),
            def("/p/b.py", "helper", 0),
            def("/p/c.py", "helper", 0),
            def("/p/d.py", "helper", 0),
        ]);
        let current = Path::new("/p/a.py");

        // No import: lexicographic.
        assert_eq!(index.resolve("helper", current, &[]).unwrap().fqn, "/p/b.py::helper");

        // Imported file wins.
        let imports = vec![PathBuf::from("/p/d.py")];
        assert_eq!(index.resolve("helper", current, &imports).unwrap().fqn, "/p/d.py::helper");
    }

    #[test]
    fn test_current_file_wins_and_short_names() {
        let index = SymbolIndex::build(vec![
            def("/p/a.rs", "run", 0),
            def("/p/b.rs", "run", 0),
            def("/p/b.rs", "Server::start", 20),
        ]);

        let found = index.resolve("run", Path::new("/p/b.rs"), &[]).unwrap();
        assert_eq!(found.fqn, "/p/b.rs::run");

        let found = index.resolve("start", Path::new("/p/a.rs"), &[]).unwrap();
        assert_eq!(found.fqn, "/p/b.rs::Server::start");
        assert!(index.declares_name("start"));
        assert!(!index.declares_name("stop"));
    }

    #[test]
    fn test_last_write_wins() {
        let index = SymbolIndex::build(vec![def("/p/a.py", "f", 0), def("/p/a.py", "f", 50)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("/p/a.py::f").unwrap().start_byte, 50);
    }

    #[test]
    fn test_find_file_named() {
        let index = SymbolIndex::build(vec![
            def("/p/src/Order.java", "total", 0),
            def("/p/Main.java", "main", 0),
        ]);
        let found = index.find_file_named(
            &["Order.java".to_string()],
            Path::new("/p/Main.java"),
            &[],
        );
        assert_eq!(found, Some(Path::new("/p/src/Order.java")));
    }
}
