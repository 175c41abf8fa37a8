//! C and C++ adapter.

use std::path::PathBuf;

use regex::Regex;

use super::blocks::{self, BraceStyle};
use super::calls::{self, CallStyle, ScanRules};
use super::{definition, innermost, CallContext, Container, LanguageAdapter};
use crate::imports::ImportResolver;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref INCLUDE: Regex = Regex::new(r#"^\s*#\s*include\s+"([^"]+\.h(?:pp|xx)?)""#).unwrap();
    /// Return type, optional `Class::` qualifier, name and `(`.
    static ref FUNCTION: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected)\s*:\s*)?([A-Za-z_][\w:<>,*&\s]*?)[\s*&]+([A-Za-z_]\w*::)?(~?[A-Za-z_]\w*)\s*\("
    ).unwrap();
    static ref CLASS: Regex = Regex::new(
        r"^\s*(?:template\s*<[^>]*>\s*)?(?:class|struct|union)\s+([A-Za-z_]\w*)[^;{]*\{"
    ).unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["//", "/*", "*", "#"],
    style: CallStyle::Receivers {
        receiver_files,
        paren_free: false,
    },
};

const SOURCE_EXTENSIONS: [&str; 5] = ["cpp", "cc", "cxx", "c++", "c"];

const NOT_A_FUNCTION: &[&str] = &[
    "return", "else", "if", "while", "for", "switch", "case", "do", "delete", "new", "throw",
    "sizeof", "typedef", "using", "goto", "operator",
];

fn receiver_files(receiver: &str) -> Vec<String> {
    ["cpp", "cc", "h", "hpp"]
        .iter()
        .map(|ext| format!("{}.{}", receiver, ext))
        .collect()
}

/// Whether the first of `{` and `;` after `from` is a `{`.
fn has_body(content: &str, from: usize) -> bool {
    let rest = &content[from..];
    match (rest.find('{'), rest.find(';')) {
        (Some(open), Some(semi)) => open < semi,
        (Some(_), None) => true,
        _ => false,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CppAdapter;

impl LanguageAdapter for CppAdapter {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            let Some(caps) = INCLUDE.captures(line) else {
                continue;
            };
            let header = &caps[1];
            if !resolver.resolve([header]) {
                continue;
            }
            // The implementation of a local header lives next to it.
            let header = PathBuf::from(header);
            for ext in SOURCE_EXTENSIONS {
                resolver.resolve([header.with_extension(ext)]);
            }
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
            let container = Container {
                name: caps[1].to_string(),
                start: line.start,
                end: blocks::brace_end(content, line.start, BraceStyle::C),
            };
            definitions.push(definition(
                file,
                container.name.clone(),
                container.start,
                container.end,
                SymbolKind::Class,
            ));
            containers.push(container);
        }

        for line in blocks::lines(content) {
            let Some(caps) = FUNCTION.captures(line.text) else {
                continue;
            };
            let return_type = caps[1].trim();
            let name = &caps[3];
            let first = return_type.split_whitespace().next().unwrap_or_default();
            if return_type.is_empty()
                || name.starts_with('~')
                || NOT_A_FUNCTION.contains(&first)
                || NOT_A_FUNCTION.contains(&name)
                || return_type.ends_with("operator")
                || !has_body(content, line.start)
            {
                continue;
            }

            let name = match caps.get(2) {
                Some(qualifier) => format!("{}::{}", qualifier.as_str().trim_end_matches(':'), name),
                None => match innermost(&containers, line.start) {
                    Some(container) => format!("{}::{}", container.name, name),
                    None => name.to_string(),
                },
            };
            let end = blocks::brace_end(content, line.start, BraceStyle::C);
            definitions.push(definition(file, name, line.start, end, SymbolKind::Function));
        }

        definitions.sort_by_key(|d| d.start_byte);
        definitions
    }

    fn extract_calls(&self, file: &SourceFile, ctx: &CallContext<'_>) -> Vec<CallEdge> {
        calls::scan_calls(file, ctx, &RULES)
    }
}
