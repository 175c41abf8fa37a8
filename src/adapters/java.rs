//! Java and C# adapter.
//!
//! Both languages see every type of the same package/namespace without an
//! import, so sibling files are always part of the related set.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{ImportResolver, StandardLibrary};
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    /// Modifiers and return type, then the method name and `(`.
    static ref METHOD: Regex =
        Regex::new(r"^\s*((?:@?[\w<>\[\],.?]+\s+)+)([A-Za-z_]\w*)\s*\(").unwrap();
    static ref TYPE_DECL: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected|internal|static|final|abstract|sealed|partial|readonly)\s+)*(?:class|interface|enum|record|struct)\s+([A-Za-z_]\w*)"
    ).unwrap();
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "final", "abstract",
    "synchronized", "native", "default", "virtual", "override", "sealed", "async", "extern",
    "unsafe", "partial", "new", "readonly",
];

const NOT_A_METHOD: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "synchronized", "using", "lock",
    "return", "new", "else", "throw", "case", "await", "yield", "typeof", "sizeof", "nameof",
];

const JAVA_RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Receivers {
        receiver_files: java_receiver,
        paren_free: false,
    },
};

const CSHARP_RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*"],
    style: CallStyle::Receivers {
        receiver_files: csharp_receiver,
        paren_free: false,
    },
};

fn java_receiver(receiver: &str) -> Vec<String> {
    vec![format!("{}.java", receiver)]
}

fn csharp_receiver(receiver: &str) -> Vec<String> {
    vec![format!("{}.cs", receiver)]
}

#[derive(Debug, Clone, Copy)]
pub struct JavaAdapter {
    csharp: bool,
}

impl JavaAdapter {
    pub const fn java() -> Self {
        Self { csharp: false }
    }

    pub const fn csharp() -> Self {
        Self { csharp: true }
    }

    fn language(&self) -> Language {
        if self.csharp {
            Language::CSharp
        } else {
            Language::Java
        }
    }

    fn extension(&self) -> &'static str {
        if self.csharp {
            "cs"
        } else {
            "java"
        }
    }

    /// Imported type or namespace path of one line.
    fn imported_module<'a>(&self, line: &'a str) -> Option<&'a str> {
        let keyword = if self.csharp { "using " } else { "import " };
        let rest = line.strip_prefix(keyword)?.trim();
        let rest = rest.strip_prefix("static ").unwrap_or(rest).trim();
        if !rest.ends_with(';') || rest.contains('=') || rest.starts_with('(') {
            return None;
        }
        Some(rest.trim_end_matches(';').trim())
    }
}

/// Whether a method-like header is a declaration of a method.
fn is_method_header(line: &str, prefix: &str, name: &str, stem: &str) -> bool {
    let trimmed = line.trim_end();
    if trimmed.ends_with(';') || NOT_A_METHOD.contains(&name) || name == stem {
        return false;
    }

    let tokens: Vec<&str> = prefix.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return false;
    };
    if NOT_A_METHOD.contains(first) {
        return false;
    }
    // Constructors of other types: modifiers only, no return type.
    tokens
        .iter()
        .any(|t| !t.starts_with('@') && !MODIFIERS.contains(t))
}

impl LanguageAdapter for JavaAdapter {
    fn name(&self) -> &'static str {
        if self.csharp {
            "csharp"
        } else {
            "java"
        }
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);
        let stdlib = StandardLibrary::global();

        for line in file.content.lines() {
            let Some(module) = self.imported_module(line.trim()) else {
                continue;
            };
            if stdlib.contains(self.language(), module) {
                continue;
            }
            let Some(last) = module.rsplit('.').next().filter(|s| *s != "*") else {
                continue;
            };
            resolver.resolve([format!("{}.{}", last, self.extension())]);
        }

        resolver.add_siblings(&[self.extension()]);
        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let content = &file.content;
        let stem = file.stem();
        let mut definitions = Vec::new();

        for line in blocks::lines(content) {
            let (name, kind) = if let Some(caps) = TYPE_DECL.captures(line.text) {
                (caps[1].to_string(), SymbolKind::Class)
            } else if let Some(caps) = METHOD.captures(line.text) {
                if !is_method_header(line.text, &caps[1], &caps[2], stem) {
                    continue;
                }
                (caps[2].to_string(), SymbolKind::Function)
            } else {
                continue;
            };
            let end = blocks::brace_end(content, line.start, BraceStyle::C);
            definitions.push(definition(file, name, line.start, end, kind));
        }

        definitions
    }

    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge> {
        let rules = if self.csharp { &CSHARP_RULES } else { &JAVA_RULES };
        calls::scan_calls(file, ctx, rules)
    }
}
