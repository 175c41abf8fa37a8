//! Python adapter.

use std::path::{Path, PathBuf};

use regex::Regex;

use super::blocks;
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{ImportResolver, StandardLibrary};
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref DEF: Regex = Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap();
    static ref CLASS: Regex = Regex::new(r"^\s*class\s+([A-Za-z_]\w*)\s*[(:]").unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["#"],
    style: CallStyle::Words,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAdapter;

impl LanguageAdapter for PythonAdapter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["import", ..] if parts.len() >= 2 => {
                    for module in line["import".len()..].split(',') {
                        if let Some(module) = module.split_whitespace().next() {
                            resolve_module(&mut resolver, module, &[]);
                        }
                    }
                }
                ["from", module, "import", names @ ..] if !names.is_empty() => {
                    let names: Vec<&str> = names
                        .iter()
                        .flat_map(|n| n.split(','))
                        .map(|n| n.trim_matches(|c: char| c == '(' || c == ')'))
                        .filter(|n| !n.is_empty() && *n != "as")
                        .collect();
                    resolve_module(&mut resolver, module, &names);
                }
                _ => {}
            }
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let mut definitions = Vec::new();

        for line in blocks::lines(&file.content) {
            let (caps, kind) = match DEF.captures(line.text) {
                Some(caps) => (caps, SymbolKind::Function),
                None => match CLASS.captures(line.text) {
                    Some(caps) => (caps, SymbolKind::Class),
                    None => continue,
                },
            };
            let end = blocks::indentation_end(&file.content, line.start);
            definitions.push(definition(file, &caps[1], line.start, end, kind));
        }

        definitions
    }

    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge> {
        calls::scan_calls(file, ctx, &RULES)
    }
}

/// Resolve `module` (absolute or dotted-relative) to a file. For
/// `from . import x` forms, `names` are tried as submodules.
fn resolve_module(resolver: &mut ImportResolver, module: &str, names: &[&str]) {
    let dots = module.chars().take_while(|c| *c == '.').count();
    let rest = &module[dots..];

    if dots == 0 && StandardLibrary::global().contains(Language::Python, module) {
        return;
    }

    let mut base: PathBuf = resolver.dir().to_path_buf();
    for _ in 1..dots {
        base = base.parent().map(Path::to_path_buf).unwrap_or(base);
    }

    if rest.is_empty() {
        for name in names {
            resolver.resolve_from(&base, module_candidates(name));
        }
        resolver.resolve_from(&base, ["__init__.py"]);
        return;
    }

    if !resolver.resolve_from(&base, module_candidates(rest)) {
        // `from pkg import module` where `pkg` has no `__init__.py`
        for name in names {
            resolver.resolve_from(&base, module_candidates(&format!("{}.{}", rest, name)));
        }
    }
}

/// `a.b` -> `a/b.py`, `a/b/__init__.py`
fn module_candidates(module: &str) -> [PathBuf; 2] {
    let path: PathBuf = module.split('.').collect();
    [path.with_extension("py"), path.join("__init__.py")]
}
