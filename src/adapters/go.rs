//! Go adapter.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{self, extract_quoted, ImportResolver};
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref FUNC: Regex =
        Regex::new(r"^func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*[\[(]").unwrap();
    static ref TYPE: Regex =
        Regex::new(r"^type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(?:struct|interface)\b").unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Words,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct GoAdapter;

impl LanguageAdapter for GoAdapter {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);
        let mut in_block = false;

        for line in file.content.lines() {
            let line = line.trim();
            let spec = if in_block {
                if line.starts_with(')') {
                    in_block = false;
                    continue;
                }
                line
            } else if let Some(rest) = line.strip_prefix("import") {
                let rest = rest.trim_start();
                if rest.starts_with('(') {
                    in_block = true;
                    continue;
                }
                rest
            } else {
                continue;
            };

            // `alias "path"` or `"path"`
            let Some(quoted) = spec.find('"').map(|i| &spec[i..]) else {
                continue;
            };
            let Some(path) = extract_quoted(quoted) else {
                continue;
            };
            if path.starts_with("./") || path.starts_with("../") {
                if let Some(found) = imports::first_file_with_extension(&resolver.dir().join(path), "go") {
                    resolver.add(found);
                }
            }
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let mut definitions = Vec::new();

        for line in blocks::lines(&file.content) {
            let (name, kind, end) = if let Some(caps) = FUNC.captures(line.text) {
                // The match ends on the `(` or `[` opening the parameters.
                let open = line.start + caps.get(0).map_or(0, |m| m.end()).saturating_sub(1);
                (caps[1].to_string(), SymbolKind::Function, func_end(&file.content, open))
            } else if let Some(caps) = TYPE.captures(line.text) {
                let end = blocks::brace_end(&file.content, line.start, BraceStyle::GO);
                (caps[1].to_string(), SymbolKind::Class, end)
            } else {
                continue;
            };
            definitions.push(definition(file, name, line.start, end, kind));
        }

        definitions
    }

    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge> {
        calls::scan_calls(file, ctx, &RULES)
    }
}

/// End of a function whose type or value parameters open at `open`. The
/// body is the first brace after the parameters that does not belong to an
/// `interface{..}` or `struct{..}` type in the result.
fn func_end(content: &str, open: usize) -> usize {
    let body = params_end(content, open).and_then(|after| body_open(content, after));
    match body {
        Some(body) => blocks::matching_brace(content, body, BraceStyle::GO).unwrap_or(content.len()),
        None => content.len(),
    }
}

fn params_end(content: &str, open: usize) -> Option<usize> {
    let mut end = blocks::matching_delimiter(content, open)?;
    if content.as_bytes().get(open) == Some(&b'[') {
        let params = end + content[end..].find('(')?;
        end = blocks::matching_delimiter(content, params)?;
    }
    Some(end)
}

fn body_open(content: &str, from: usize) -> Option<usize> {
    let mut at = from;
    loop {
        let open = at + content[at..].find('{')?;
        let before = content[at..open].trim_end();
        if before.ends_with("interface") || before.ends_with("struct") {
            at = blocks::matching_brace(content, open, BraceStyle::GO)?;
            continue;
        }
        return Some(open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SymbolIndex;
    use crate::processing::Language;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_imports_relative_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("util")).unwrap();
        std::fs::write(root.join("util/b.go"), "package util\n").unwrap();
        std::fs::write(root.join("util/a.go"), "package util\n").unwrap();
        let content = "package main\n\nimport (\n\t\"fmt\"\n\tu \"./util\"\n)\nimport \"github.com/x/y\"\n";
        std::fs::write(root.join("main.go"), content).unwrap();

        let file = SourceFile::new(root.join("main.go"), Language::Go, content);
        assert_eq!(GoAdapter.extract_imports(&file), vec![root.join("util/a.go")]);
    }

    #[test]
    fn test_index_symbols() {
        let content = "package main\n\ntype Server struct {\n\tport int\n}\n\nfunc (s *Server) Start(cfg Config) error {\n\treturn nil\n}\n\nfunc main() {\n\ts := &Server{}\n\ts.Start(load())\n}\n";
        let file = SourceFile::new("/p/main.go", Language::Go, content);
        let defs = GoAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Server", "Start", "main"]);
        assert_eq!(defs[0].kind, SymbolKind::Class);
        assert_eq!(&content[defs[0].start_byte..defs[0].end_byte], "type Server struct {\n\tport int\n}");
        assert_eq!(defs[1].signature_types, vec!["Server", "Config"]);
        assert!(content[..defs[2].end_byte].ends_with("load())\n}"));
    }

    #[test]
    fn test_empty_interface_parameters_do_not_end_the_body() {
        let content = "package main\n\nfunc Log(v interface{}, opts struct{}) interface{} {\n\tformat(v)\n\treturn v\n}\n\nfunc Map[T any](xs []T) []T {\n\treturn xs\n}\n";
        let file = SourceFile::new("/p/log.go", Language::Go, content);
        let defs = GoAdapter.index_symbols(&file);

        assert_eq!(defs.len(), 2);
        assert_eq!(
            &content[defs[0].start_byte..defs[0].end_byte],
            "func Log(v interface{}, opts struct{}) interface{} {\n\tformat(v)\n\treturn v\n}"
        );
        assert_eq!(
            &content[defs[1].start_byte..defs[1].end_byte],
            "func Map[T any](xs []T) []T {\n\treturn xs\n}"
        );
    }

    #[test]
    fn test_extract_calls() {
        let content = "package main\n\nfunc load() Config {\n\treturn Config{}\n}\n\nfunc main() {\n\tfmt.Println(load())\n}\n";
        let file = SourceFile::new("/p/main.go", Language::Go, content);
        let index = SymbolIndex::build(GoAdapter.index_symbols(&file));
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            GoAdapter.extract_calls(&file, &ctx),
            vec![CallEdge::new("/p/main.go::main", "/p/main.go::load")]
        );
    }
}
