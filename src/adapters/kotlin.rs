//! Kotlin adapter.

use std::path::{Path, PathBuf};

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, innermost, CallContext, Container, LanguageAdapter};
use crate::imports::{ImportResolver, StandardLibrary};
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref IMPORT: Regex = Regex::new(
        r"^\s*import\s+([a-zA-Z_]\w*(?:\.[a-zA-Z_]\w*)*(?:\.\*)?)\s*$"
    ).unwrap();
    static ref FUN: Regex = Regex::new(
        r"^\s*(?:(?:private|public|internal|protected|inline|suspend|override|open|abstract|operator|infix|tailrec|actual|expect)\s+)*fun\s+(?:<[^>]*>\s*)?(?:[A-Za-z_][\w<>?]*\.)?([A-Za-z_]\w*)\s*\("
    ).unwrap();
    static ref CLASS: Regex = Regex::new(
        r"^\s*(?:(?:data|sealed|abstract|open|enum|private|internal|public|protected|inner|annotation|value)\s+)*(?:class|object|interface)\s+([A-Za-z_]\w*)(?:<[^>]*>)?"
    ).unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Receivers {
        receiver_files,
        paren_free: false,
    },
};

/// Directory levels searched above the importing file for package paths.
const MAX_PACKAGE_ANCESTORS: usize = 3;

fn receiver_files(receiver: &str) -> Vec<String> {
    vec![format!("{}.kt", receiver)]
}

/// How a declaration header continues after its parameter list.
#[derive(Debug, PartialEq, Eq)]
enum Body {
    /// `{` at this offset.
    Block(usize),
    /// `=` at this offset.
    Expression(usize),
    None,
}

/// Offset just past the `)` matching the `(` at `open`.
fn close_paren(content: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, b) in content.as_bytes()[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    content.len()
}

/// Find the body that follows a header ending at `after`. Return types and
/// `where` clauses on continuation lines are skipped.
fn body_after(content: &str, after: usize) -> Body {
    let mut offset = after;
    for (n, segment) in content[after..].split_inclusive('\n').enumerate() {
        let trimmed = segment.trim();
        let continues = n == 0
            || trimmed.starts_with(':')
            || trimmed.starts_with("where")
            || trimmed.starts_with('{')
            || trimmed.starts_with('=');
        if !continues {
            return Body::None;
        }
        let open = segment.find('{');
        let eq = segment.find('=');
        match (open, eq) {
            (Some(o), Some(e)) if e < o => return Body::Expression(offset + e),
            (Some(o), _) => return Body::Block(offset + o),
            (None, Some(e)) => return Body::Expression(offset + e),
            (None, None) => {}
        }
        offset += segment.len();
    }
    Body::None
}

/// Import `a.b.C` may live at `C.kt` beside the importer or at `a/b/C.kt`
/// below the importer's directory or one of its ancestors.
fn import_candidates(dir: &Path, module: &str) -> Vec<PathBuf> {
    let segments: Vec<&str> = module.split('.').collect();
    let Some(last) = segments.last() else {
        return Vec::new();
    };
    let mut candidates = vec![dir.join(format!("{}.kt", last))];

    let relative: PathBuf = segments.iter().collect::<PathBuf>().with_extension("kt");
    let mut base = Some(dir);
    for _ in 0..=MAX_PACKAGE_ANCESTORS {
        let Some(current) = base else {
            break;
        };
        candidates.push(current.join(&relative));
        base = current.parent();
    }
    candidates
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KotlinAdapter;

impl LanguageAdapter for KotlinAdapter {
    fn name(&self) -> &'static str {
        "kotlin"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);
        let stdlib = StandardLibrary::global();

        for line in file.content.lines() {
            let Some(caps) = IMPORT.captures(line) else {
                continue;
            };
            let module = &caps[1];
            if module.ends_with(".*") || stdlib.contains(Language::Kotlin, module) {
                continue;
            }
            let candidates = import_candidates(resolver.dir(), module);
            let dir = resolver.dir().to_path_buf();
            resolver.resolve_from(&dir, candidates);
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let mut containers = Vec::new();
        let mut definitions = Vec::new();

        for line in blocks::lines(content) {
            let Some(caps) = CLASS.captures(line.text) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let mut after = line.start + whole.end();
            if content[after..].trim_start().starts_with('(') {
                let open = after + content[after..].find('(').unwrap_or(0);
                after = close_paren(content, open);
            }
            let end = match body_after(content, after) {
                Body::Block(open) => {
                    blocks::matching_brace(content, open, BraceStyle::C).unwrap_or(content.len())
                }
                _ => blocks::line_end(content, after),
            };
            let container = Container {
                name: caps[1].to_string(),
                start: line.start,
                end,
            };
            definitions.push(definition(file, &caps[1], line.start, end, SymbolKind::Class));
            containers.push(container);
        }

        for line in blocks::lines(content) {
            let Some(caps) = FUN.captures(line.text) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let after = close_paren(content, line.start + whole.end() - 1);
            let end = match body_after(content, after) {
                Body::Block(open) => {
                    blocks::matching_brace(content, open, BraceStyle::C).unwrap_or(content.len())
                }
                Body::Expression(eq) => blocks::line_end(content, eq),
                // Abstract and interface members.
                Body::None => continue,
            };
            let name = match innermost(&containers, line.start) {
                Some(container) => format!("{}::{}", container.name, &caps[1]),
                None => caps[1].to_string(),
            };
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
    use pretty_assertions::assert_eq;

    const CART: &str = "package shop\n\ndata class Item(val price: Int)\n\ninterface Priced {\n    fun price(): Int\n}\n\nclass Cart {\n    private val items = mutableListOf<Item>()\n\n    fun add(item: Item) {\n        items += item\n    }\n\n    fun total(): Int = items.sumOf { it.price }\n}\n\nfun main() {\n    val cart = Cart()\n    cart.add(Item(3))\n    println(cart.total())\n}\n";

    #[test]
    fn test_index_symbols() {
        let file = SourceFile::new("/p/Cart.kt", Language::Kotlin, CART);
        let defs = KotlinAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("Item", SymbolKind::Class),
                ("Priced", SymbolKind::Class),
                ("Cart", SymbolKind::Class),
                ("Cart::add", SymbolKind::Function),
                ("Cart::total", SymbolKind::Function),
                ("main", SymbolKind::Function),
            ]
        );
        assert_eq!(&CART[defs[0].start_byte..defs[0].end_byte], "data class Item(val price: Int)\n");
        assert_eq!(
            &CART[defs[4].start_byte..defs[4].end_byte],
            "    fun total(): Int = items.sumOf { it.price }\n"
        );
        assert_eq!(defs[3].signature_types, vec!["Item"]);
    }

    #[test]
    fn test_import_candidates() {
        let candidates = import_candidates(Path::new("/src/app/ui"), "com.shop.Cart");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/src/app/ui/Cart.kt"),
                PathBuf::from("/src/app/ui/com/shop/Cart.kt"),
                PathBuf::from("/src/app/com/shop/Cart.kt"),
                PathBuf::from("/src/com/shop/Cart.kt"),
                PathBuf::from("/com/shop/Cart.kt"),
            ]
        );
    }

    #[test]
    fn test_extract_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("com/shop")).unwrap();
        std::fs::create_dir_all(root.join("app")).unwrap();
        std::fs::write(root.join("com/shop/Cart.kt"), CART).unwrap();
        let content = "import kotlin.math.max\nimport com.shop.Cart\nimport com.shop.*\n";

        let file = SourceFile::new(root.join("app/Main.kt"), Language::Kotlin, content);
        assert_eq!(KotlinAdapter.extract_imports(&file), vec![root.join("com/shop/Cart.kt")]);
    }

    #[test]
    fn test_extract_calls() {
        let file = SourceFile::new("/p/Cart.kt", Language::Kotlin, CART);
        let index = SymbolIndex::build(KotlinAdapter.index_symbols(&file));
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            KotlinAdapter.extract_calls(&file, &ctx),
            vec![
                CallEdge::new("/p/Cart.kt::main", "/p/Cart.kt::Cart::add"),
                CallEdge::new("/p/Cart.kt::main", "/p/Cart.kt::Cart::total"),
            ]
        );
    }
}
