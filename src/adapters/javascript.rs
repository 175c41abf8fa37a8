//! JavaScript and TypeScript adapter.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{extract_quoted, ImportResolver};
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref FUNCTION: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*[<(]"
    ).unwrap();
    static ref BINDING: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\b|function\b|\()"
    ).unwrap();
    static ref CLASS: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)"
    ).unwrap();
    static ref INTERFACE: Regex =
        Regex::new(r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)").unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Words,
};

const EXTENSIONS: [&str; 6] = [".js", ".ts", ".jsx", ".tsx", "/index.js", "/index.ts"];

#[derive(Debug, Clone, Copy)]
pub struct JavaScriptAdapter {
    typescript: bool,
}

impl JavaScriptAdapter {
    pub const fn javascript() -> Self {
        Self { typescript: false }
    }

    pub const fn typescript() -> Self {
        Self { typescript: true }
    }

    /// Module specifiers referenced by one line.
    fn specifiers(line: &str) -> Vec<&str> {
        let mut found = Vec::new();

        if line.starts_with("import ") || line.starts_with("export ") {
            if let Some(i) = line.rfind(" from ") {
                found.extend(extract_quoted(&line[i + " from ".len()..]));
            } else if let Some(rest) = line.strip_prefix("import ") {
                found.extend(extract_quoted(rest));
            }
        }

        let mut rest = line;
        while let Some(i) = rest.find("require(") {
            rest = &rest[i + "require(".len()..];
            found.extend(extract_quoted(rest));
        }

        found
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn name(&self) -> &'static str {
        if self.typescript {
            "typescript"
        } else {
            "javascript"
        }
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            for spec in Self::specifiers(line.trim()) {
                if !spec.starts_with('.') {
                    continue;
                }
                let candidates = std::iter::once(spec.to_string())
                    .chain(EXTENSIONS.iter().map(|ext| format!("{}{}", spec, ext)));
                resolver.resolve(candidates);
            }
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let mut definitions = Vec::new();

        for line in blocks::lines(content) {
            let text = line.text;
            let (name, kind, end) = if let Some(caps) = FUNCTION.captures(text) {
                let end = blocks::brace_end(content, line.start, BraceStyle::JS);
                (caps[1].to_string(), SymbolKind::Function, end)
            } else if let Some(caps) = BINDING.captures(text) {
                let end = blocks::arrow_or_brace_end(content, line.start);
                (caps[1].to_string(), SymbolKind::Function, end)
            } else if let Some(caps) = CLASS.captures(text) {
                let end = blocks::brace_end(content, line.start, BraceStyle::JS);
                (caps[1].to_string(), SymbolKind::Class, end)
            } else if let Some(caps) = INTERFACE.captures(text).filter(|_| self.typescript) {
                let end = blocks::brace_end(content, line.start, BraceStyle::JS);
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
