//! PHP adapter.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{extract_quoted, ImportResolver};
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref TOP_LEVEL: Regex = Regex::new(r"^function\s+&?([A-Za-z_]\w*)\s*\(").unwrap();
    static ref METHOD: Regex = Regex::new(
        r"^\s+(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?([A-Za-z_]\w*)\s*\("
    ).unwrap();
    static ref CLASS: Regex = Regex::new(
        r"^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+([A-Za-z_]\w*)"
    ).unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "#", "/*", "*"],
    style: CallStyle::Words,
};

const INCLUDE_KEYWORDS: [&str; 4] = ["require_once", "include_once", "require", "include"];

#[derive(Debug, Default, Clone, Copy)]
pub struct PhpAdapter;

impl LanguageAdapter for PhpAdapter {
    fn name(&self) -> &'static str {
        "php"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            let line = line.trim();
            let Some(rest) = INCLUDE_KEYWORDS.iter().find_map(|kw| line.strip_prefix(kw)) else {
                continue;
            };
            // `require __DIR__ . '/lib.php';`
            let Some(quote) = rest.find(|c: char| c == '\'' || c == '"') else {
                continue;
            };
            let Some(path) = extract_quoted(&rest[quote..]) else {
                continue;
            };
            let path = if rest[..quote].contains("__DIR__") {
                path.trim_start_matches('/')
            } else {
                path
            };
            resolver.resolve([path]);
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let mut definitions = Vec::new();

        for line in blocks::lines(content) {
            let (name, kind, end) = if let Some(caps) = TOP_LEVEL.captures(line.text) {
                let end = blocks::next_function_end(content, line.start);
                (caps[1].to_string(), SymbolKind::Function, end)
            } else if let Some(caps) = METHOD.captures(line.text) {
                let end = blocks::brace_end(content, line.start, BraceStyle::PHP);
                (caps[1].to_string(), SymbolKind::Function, end)
            } else if let Some(caps) = CLASS.captures(line.text) {
                let end = blocks::brace_end(content, line.start, BraceStyle::PHP);
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

    fn preamble(&self) -> &'static str {
        "<?php\n\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SymbolIndex;
    use crate::processing::Language;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("lib.php"), "<?php\n").unwrap();
        std::fs::write(root.join("db.php"), "<?php\n").unwrap();
        let content = "<?php\nrequire_once 'lib.php';\ninclude(__DIR__ . '/db.php');\nrequire 'vendor/autoload.php';\n";

        let file = SourceFile::new(root.join("index.php"), Language::Php, content);
        assert_eq!(
            PhpAdapter.extract_imports(&file),
            vec![root.join("lib.php"), root.join("db.php")]
        );
    }

    #[test]
    fn test_index_symbols() {
        let content = "<?php\n\nfunction main() {\n    $r = new Report();\n    echo $r->render();\n}\n\nclass Report {\n    public function render(): string {\n        return helper();\n    }\n}\n\nfunction helper() {\n    return 'x';\n}\n";
        let file = SourceFile::new("/p/index.php", Language::Php, content);
        let defs = PhpAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("main", SymbolKind::Function),
                ("Report", SymbolKind::Class),
                ("render", SymbolKind::Function),
                ("helper", SymbolKind::Function),
            ]
        );
        // Top-level functions run to the next top-level `function`.
        assert!(content[defs[0].start_byte..defs[0].end_byte].ends_with("}\n}\n\n"));
        assert_eq!(
            &content[defs[2].start_byte..defs[2].end_byte],
            "    public function render(): string {\n        return helper();\n    }"
        );
    }

    #[test]
    fn test_extract_calls() {
        let content = "<?php\n\nfunction helper() {\n    return 1;\n}\n\nfunction main() {\n    echo helper();\n}\n";
        let file = SourceFile::new("/p/index.php", Language::Php, content);
        let index = SymbolIndex::build(PhpAdapter.index_symbols(&file));
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            PhpAdapter.extract_calls(&file, &ctx),
            vec![CallEdge::new("/p/index.php::main", "/p/index.php::helper")]
        );
    }
}
