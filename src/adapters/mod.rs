//! Per-language adapters.
//!
//! An adapter knows three things about its language: how imports name other
//! local files, where definitions start and end, and what a call site looks
//! like. All three are lightweight text heuristics; nothing here builds a
//! full syntax tree.

pub mod blocks;
pub mod calls;
pub mod signature;

mod cpp;
mod go;
mod java;
mod javascript;
mod kotlin;
mod php;
mod python;
mod ruby;
mod rust;
mod swift;

use std::path::PathBuf;

use crate::analysis::SymbolIndex;
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

pub use cpp::CppAdapter;
pub use go::GoAdapter;
pub use java::JavaAdapter;
pub use javascript::JavaScriptAdapter;
pub use kotlin::KotlinAdapter;
pub use php::PhpAdapter;
pub use python::PythonAdapter;
pub use ruby::RubyAdapter;
pub use rust::RustAdapter;
pub use swift::SwiftAdapter;

/// Read-only state available while extracting calls.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Global index over every related file.
    pub index: &'a SymbolIndex,
    /// Resolved imports of the file being scanned, in import order.
    pub imports: &'a [PathBuf],
}

/// Language-specific import, definition and call recognition.
pub trait LanguageAdapter: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// Local files imported by `file`, canonical, without duplicates and
    /// never including `file` itself. Unresolvable imports are dropped.
    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf>;

    /// Function and type definitions declared in `file`.
    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition>;

    /// Call edges originating in `file`, resolved against the global index.
    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge>;

    /// Text prepended to the assembled output of a file.
    fn preamble(&self) -> &'static str {
        ""
    }
}

static PYTHON: PythonAdapter = PythonAdapter;
static GO: GoAdapter = GoAdapter;
static JAVASCRIPT: JavaScriptAdapter = JavaScriptAdapter::javascript();
static TYPESCRIPT: JavaScriptAdapter = JavaScriptAdapter::typescript();
static RUBY: RubyAdapter = RubyAdapter;
static PHP: PhpAdapter = PhpAdapter;
static JAVA: JavaAdapter = JavaAdapter::java();
static CSHARP: JavaAdapter = JavaAdapter::csharp();
static RUST: RustAdapter = RustAdapter;
static SWIFT: SwiftAdapter = SwiftAdapter;
static CPP: CppAdapter = CppAdapter;
static KOTLIN: KotlinAdapter = KotlinAdapter;

/// The adapter for `language`, if dependency analysis supports it.
pub fn adapter_for(language: Language) -> Option<&'static dyn LanguageAdapter> {
    let adapter: &'static dyn LanguageAdapter = match language {
        Language::Python => &PYTHON,
        Language::Go => &GO,
        Language::JavaScript => &JAVASCRIPT,
        Language::TypeScript => &TYPESCRIPT,
        Language::Ruby => &RUBY,
        Language::Php => &PHP,
        Language::Java => &JAVA,
        Language::CSharp => &CSHARP,
        Language::Rust => &RUST,
        Language::Swift => &SWIFT,
        Language::Cpp | Language::C => &CPP,
        Language::Kotlin => &KOTLIN,
        Language::Unknown => return None,
    };
    Some(adapter)
}

/// Build a definition whose header line starts at `start`.
pub(crate) fn definition(
    file: &SourceFile,
    name: impl Into<String>,
    start: usize,
    end: usize,
    kind: SymbolKind,
) -> SymbolDefinition {
    let name = name.into();
    let start = blocks::line_start(&file.content, start);
    let end = end.clamp(start, file.content.len());
    let header = header_text(&file.content, start);
    SymbolDefinition {
        fqn: file.fqn(&name),
        signature_types: signature::signature_types(header, &name),
        name,
        file_path: file.path.clone(),
        start_byte: start,
        end_byte: end,
        language: file.language,
        kind,
    }
}

/// Header text from `start` up to the body opener or end of line.
fn header_text(content: &str, start: usize) -> &str {
    let rest = &content[start..];
    let line = rest.split('\n').next().unwrap_or(rest);
    line.split('{').next().unwrap_or(line)
}

/// A named region such as a class or impl block, used to qualify methods.
#[derive(Debug, Clone)]
pub(crate) struct Container {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl Container {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Innermost container enclosing `offset`.
pub(crate) fn innermost(containers: &[Container], offset: usize) -> Option<&Container> {
    containers
        .iter()
        .filter(|c| c.contains(offset))
        .min_by_key(|c| c.end - c.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_language_has_an_adapter() {
        for language in Language::ALL {
            assert!(adapter_for(language).is_some(), "{language}");
        }
        assert!(adapter_for(Language::Unknown).is_none());
        assert_eq!(adapter_for(Language::Php).unwrap().preamble(), "<?php\n\n");
        assert_eq!(adapter_for(Language::Go).unwrap().preamble(), "");
    }

    #[test]
    fn test_definition_starts_at_line_start() {
        let file = SourceFile::new(
            "/p/a.py",
            Language::Python,
            "x = 1\n    def run(cfg: Config):\n        pass\n",
        );
        let offset = file.content.find("def").unwrap();
        let def = definition(&file, "run", offset, file.content.len(), SymbolKind::Function);
        assert_eq!(def.start_byte, 6);
        assert_eq!(def.fqn, "/p/a.py::run");
        assert_eq!(def.signature_types, vec!["Config"]);
    }

    #[test]
    fn test_innermost_container() {
        let containers = vec![
            Container { name: "Outer".into(), start: 0, end: 100 },
            Container { name: "Inner".into(), start: 10, end: 50 },
        ];
        assert_eq!(innermost(&containers, 20).unwrap().name, "Inner");
        assert_eq!(innermost(&containers, 60).unwrap().name, "Outer");
        assert!(innermost(&containers, 100).is_none());
    }
}
