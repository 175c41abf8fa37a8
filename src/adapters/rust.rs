//! Rust adapter.
//!
//! Methods inside `impl` and `trait` blocks are named `Type::method`.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, snake_case, CallStyle, ScanRules};
use super::{definition, innermost, CallContext, Container, LanguageAdapter};
use crate::imports::ImportResolver;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref FN: Regex = Regex::new(
        r#"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_]\w*)"#
    ).unwrap();
    static ref IMPL: Regex = Regex::new(
        r"(?m)^[ \t]*(?:unsafe\s+)?impl(?:<[^>]*>)?\s+(?:[\w:<>, ]+\s+for\s+)?([A-Za-z_]\w*)(?:<[^>]*>)?[^{;]*\{"
    ).unwrap();
    static ref TYPE: Regex = Regex::new(
        r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait|union)\s+([A-Za-z_]\w*)"
    ).unwrap();
    static ref MOD_DECL: Regex =
        Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)\s*;").unwrap();
    static ref USE_DECL: Regex =
        Regex::new(r"^(?:pub(?:\([^)]*\))?\s+)?use\s+([A-Za-z_]\w*)::").unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Receivers {
        receiver_files,
        paren_free: false,
    },
};

const NON_LOCAL_ROOTS: &[&str] = &["std", "core", "alloc", "proc_macro", "crate", "self", "super"];

fn receiver_files(receiver: &str) -> Vec<String> {
    let snake = format!("{}.rs", snake_case(receiver));
    let lower = format!("{}.rs", receiver.to_lowercase());
    if snake == lower {
        vec![snake]
    } else {
        vec![snake, lower]
    }
}

/// End of an item whose body is either `;` or a `{ }` block.
fn item_end(content: &str, from: usize) -> Option<usize> {
    let rest = &content[from..];
    match (rest.find('{'), rest.find(';')) {
        (Some(open), Some(semi)) if semi < open => None,
        (None, Some(_)) => None,
        (Some(open), _) => {
            Some(blocks::matching_brace(content, from + open, BraceStyle::RUST).unwrap_or(content.len()))
        }
        (None, None) => Some(content.len()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RustAdapter;

impl RustAdapter {
    fn containers(content: &str) -> Vec<Container> {
        let impls = IMPL.captures_iter(content).filter_map(|caps| {
            let whole = caps.get(0)?;
            let open = whole.end() - 1;
            Some(Container {
                name: caps[1].to_string(),
                start: whole.start(),
                end: blocks::matching_brace(content, open, BraceStyle::RUST).unwrap_or(content.len()),
            })
        });
        let traits = TYPE
            .captures_iter(content)
            .filter(|caps| caps.get(0).map_or(false, |m| m.as_str().contains("trait")))
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let end = item_end(content, whole.end())?;
                Some(Container {
                    name: caps[1].to_string(),
                    start: whole.start(),
                    end,
                })
            });
        impls.chain(traits).collect()
    }
}

impl LanguageAdapter for RustAdapter {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            let line = line.trim();
            if let Some(caps) = MOD_DECL.captures(line) {
                let name = &caps[1];
                resolver.resolve([format!("{}.rs", name), format!("{}/mod.rs", name)]);
            } else if let Some(caps) = USE_DECL.captures(line) {
                let root = &caps[1];
                if !NON_LOCAL_ROOTS.contains(&root) {
                    resolver.resolve([format!("{}.rs", root)]);
                }
            }
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let containers = Self::containers(content);
        let mut definitions = Vec::new();

        for caps in FN.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // Trait method declarations without a body.
            let Some(end) = item_end(content, whole.end()) else {
                continue;
            };
            let name = match innermost(&containers, whole.start()) {
                Some(container) => format!("{}::{}", container.name, name.as_str()),
                None => name.as_str().to_string(),
            };
            definitions.push(definition(file, name, whole.start(), end, SymbolKind::Function));
        }

        for caps in TYPE.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let rest = &content[whole.end()..];
            let end = match (rest.find('{'), rest.find(';')) {
                (Some(open), Some(semi)) if semi < open => whole.end() + semi + 1,
                (None, Some(semi)) => whole.end() + semi + 1,
                _ => item_end(content, whole.end()).unwrap_or(content.len()),
            };
            definitions.push(definition(file, name.as_str(), whole.start(), end, SymbolKind::Class));
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

    const SERVER: &str = "use std::fmt;\n\npub struct Server {\n    port: u16,\n}\n\npub struct Marker;\n\nimpl Server {\n    pub fn new(cfg: &Config) -> Self {\n        Self { port: cfg.port }\n    }\n\n    fn bind(&self) -> u16 {\n        self.port\n    }\n}\n\npub trait Handler {\n    fn handle(&self);\n}\n\nfn main() {\n    let s = Server::new(&load());\n    s.bind();\n}\n";

    #[test]
    fn test_index_symbols() {
        let file = SourceFile::new("/p/main.rs", Language::Rust, SERVER);
        let defs = RustAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("Server", SymbolKind::Class),
                ("Marker", SymbolKind::Class),
                ("Server::new", SymbolKind::Function),
                ("Server::bind", SymbolKind::Function),
                ("Handler", SymbolKind::Class),
                ("main", SymbolKind::Function),
            ]
        );
        assert_eq!(&SERVER[defs[1].start_byte..defs[1].end_byte], "pub struct Marker;");
        assert_eq!(defs[2].signature_types, vec!["Config"]);
        assert_eq!(
            &SERVER[defs[3].start_byte..defs[3].end_byte],
            "    fn bind(&self) -> u16 {\n        self.port\n    }"
        );
    }

    #[test]
    fn test_extract_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("net")).unwrap();
        std::fs::write(root.join("config.rs"), "").unwrap();
        std::fs::write(root.join("net/mod.rs"), "").unwrap();
        std::fs::write(root.join("util.rs"), "").unwrap();
        let content = "mod config;\npub mod net;\nuse std::io;\nuse crate::config::Config;\nuse util::helper;\n";

        let file = SourceFile::new(root.join("main.rs"), Language::Rust, content);
        assert_eq!(
            RustAdapter.extract_imports(&file),
            vec![root.join("config.rs"), root.join("net/mod.rs"), root.join("util.rs")]
        );
    }

    #[test]
    fn test_extract_calls() {
        let file = SourceFile::new("/p/main.rs", Language::Rust, SERVER);
        let index = SymbolIndex::build(RustAdapter.index_symbols(&file));
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            RustAdapter.extract_calls(&file, &ctx),
            vec![
                CallEdge::new("/p/main.rs::main", "/p/main.rs::Server::new"),
                CallEdge::new("/p/main.rs::main", "/p/main.rs::Server::bind"),
            ]
        );
    }

    #[test]
    fn test_receiver_files() {
        assert_eq!(receiver_files("Server"), vec!["server.rs"]);
        assert_eq!(receiver_files("HttpClient"), vec!["http_client.rs", "httpclient.rs"]);
    }
}
