//! Swift adapter.
//!
//! Every file of a module sees every other, so imports are the sibling
//! `.swift` files.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, innermost, CallContext, Container, LanguageAdapter};
use crate::imports::ImportResolver;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref FUNC: Regex = Regex::new(
        r"^\s*(?:@\w+\s+)*(?:(?:private|public|internal|fileprivate|open|static|class|final|override|mutating|nonisolated)\s+)*func\s+([A-Za-z_]\w*)"
    ).unwrap();
    static ref CONTAINER: Regex = Regex::new(
        r"^\s*(?:@\w+\s+)*(?:(?:private|public|internal|fileprivate|open|final)\s+)*(class|struct|extension|enum|protocol|actor)\s+([A-Za-z_]\w*)"
    ).unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Receivers {
        receiver_files,
        paren_free: false,
    },
};

fn receiver_files(receiver: &str) -> Vec<String> {
    vec![format!("{}.swift", receiver)]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SwiftAdapter;

impl LanguageAdapter for SwiftAdapter {
    fn name(&self) -> &'static str {
        "swift"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);
        resolver.add_siblings(&["swift"]);
        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let mut containers = Vec::new();
        let mut protocols = Vec::new();
        let mut definitions = Vec::new();

        for line in blocks::lines(content) {
            let Some(caps) = CONTAINER.captures(line.text) else {
                continue;
            };
            let container = Container {
                name: caps[2].to_string(),
                start: line.start,
                end: blocks::brace_end(content, line.start, BraceStyle::RUST),
            };
            match &caps[1] {
                "extension" => {}
                keyword => {
                    definitions.push(definition(
                        file,
                        container.name.clone(),
                        container.start,
                        container.end,
                        SymbolKind::Class,
                    ));
                    if keyword == "protocol" {
                        protocols.push(container.clone());
                    }
                }
            }
            containers.push(container);
        }

        for line in blocks::lines(content) {
            let Some(caps) = FUNC.captures(line.text) else {
                continue;
            };
            // Protocol requirements have no body.
            if protocols.iter().any(|p| p.contains(line.start) && p.start != line.start) {
                continue;
            }
            let name = match innermost(&containers, line.start) {
                Some(container) => format!("{}::{}", container.name, &caps[1]),
                None => caps[1].to_string(),
            };
            let end = blocks::brace_end(content, line.start, BraceStyle::RUST);
            definitions.push(definition(file, name, line.start, end, SymbolKind::Function));
        }

        definitions.sort_by_key(|d| d.start_byte);
        definitions
    }

    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge> {
        calls::scan_calls(file, ctx, &RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SymbolIndex;
    use crate::processing::Language;
    use pretty_assertions::assert_eq;

    const SHAPES: &str = "protocol Shape {\n    func area() -> Double\n}\n\nstruct Square: Shape {\n    let side: Double\n\n    func area() -> Double {\n        return side * side\n    }\n}\n\nextension Square {\n    static func unit() -> Square {\n        return Square(side: 1)\n    }\n}\n\nfunc main() {\n    let s = Square.unit()\n    print(s.area())\n}\n";

    #[test]
    fn test_index_symbols() {
        let file = SourceFile::new("/p/Shapes.swift", Language::Swift, SHAPES);
        let defs = SwiftAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("Shape", SymbolKind::Class),
                ("Square", SymbolKind::Class),
                ("Square::area", SymbolKind::Function),
                ("Square::unit", SymbolKind::Function),
                ("main", SymbolKind::Function),
            ]
        );
        assert_eq!(
            &SHAPES[defs[2].start_byte..defs[2].end_byte],
            "    func area() -> Double {\n        return side * side\n    }"
        );
    }

    #[test]
    fn test_siblings_are_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("Shapes.swift"), SHAPES).unwrap();
        std::fs::write(root.join("Util.swift"), "").unwrap();
        std::fs::write(root.join("main.swift"), "").unwrap();

        let file = SourceFile::new(root.join("main.swift"), Language::Swift, "");
        assert_eq!(
            SwiftAdapter.extract_imports(&file),
            vec![root.join("Shapes.swift"), root.join("Util.swift")]
        );
    }

    #[test]
    fn test_extract_calls() {
        let file = SourceFile::new("/p/Shapes.swift", Language::Swift, SHAPES);
        let index = SymbolIndex::build(SwiftAdapter.index_symbols(&file));
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            SwiftAdapter.extract_calls(&file, &ctx),
            vec![
                CallEdge::new("/p/Shapes.swift::main", "/p/Shapes.swift::Square::unit"),
                CallEdge::new("/p/Shapes.swift::main", "/p/Shapes.swift::Square::area"),
            ]
        );
    }
}
