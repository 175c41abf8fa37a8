//! Ruby adapter.

use std::path::PathBuf;

use regex::Regex;

use super::blocks;
use super::calls::{self, snake_case, CallStyle, ScanRules};
use super::{definition, CallContext, LanguageAdapter};
use crate::imports::{extract_quoted, ImportResolver, StandardLibrary};
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

lazy_static::lazy_static! {
    static ref DEF: Regex =
        Regex::new(r"^\s*def\s+(?:self\.)?([A-Za-z_]\w*[?!=]?)").unwrap();
    static ref CONTAINER: Regex =
        Regex::new(r"^\s*(?:class|module)\s+([A-Z]\w*(?:::[A-Z]\w*)*)").unwrap();
}

const RULES: ScanRules = ScanRules {
    comment_prefixes: &["#"],
    style: CallStyle::Receivers {
        receiver_files,
        paren_free: true,
    },
};

/// `DataHandler` is declared in `data_handler.rb`.
fn receiver_files(receiver: &str) -> Vec<String> {
    vec![format!("{}.rb", snake_case(receiver))]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RubyAdapter;

impl LanguageAdapter for RubyAdapter {
    fn name(&self) -> &'static str {
        "ruby"
    }

    fn extract_imports(&self, file: &SourceFile) -> Vec<PathBuf> {
        let mut resolver = ImportResolver::new(file);

        for line in file.content.lines() {
            let line = line.trim();
            let (rest, relative) = if let Some(rest) = line.strip_prefix("require_relative") {
                (rest, true)
            } else if let Some(rest) = line.strip_prefix("require") {
                (rest, false)
            } else {
                continue;
            };

            let rest = rest.trim_start().trim_start_matches('(');
            let Some(name) = extract_quoted(rest) else {
                continue;
            };
            if !relative && StandardLibrary::global().contains(Language::Ruby, name) {
                continue;
            }
            resolver.resolve([format!("{}.rb", name), name.to_string()]);
        }

        resolver.finish()
    }

    fn index_symbols(&self, file: &SourceFile) -> Vec<SymbolDefinition> {
        let mut definitions = Vec::new();

        for line in blocks::lines(&file.content) {
            let (caps, kind) = match DEF.captures(line.text) {
                Some(caps) => (caps, SymbolKind::Function),
                None => match CONTAINER.captures(line.text) {
                    Some(caps) => (caps, SymbolKind::Class),
                    None => continue,
                },
            };
            let end = blocks::keyword_end(&file.content, line.start);
            definitions.push(definition(file, &caps[1], line.start, end, kind));
        }

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

    #[test]
    fn test_extract_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("lib")).unwrap();
        std::fs::write(root.join("lib/formatter.rb"), "").unwrap();
        std::fs::write(root.join("data_handler.rb"), "").unwrap();
        let content = "require 'json'\nrequire_relative 'lib/formatter'\nrequire \"data_handler\"\nrequire 'rails'\n";

        let file = SourceFile::new(root.join("main.rb"), Language::Ruby, content);
        assert_eq!(
            RubyAdapter.extract_imports(&file),
            vec![root.join("lib/formatter.rb"), root.join("data_handler.rb")]
        );
    }

    #[test]
    fn test_index_symbols() {
        let content = "class Greeter\n  def self.create(name)\n    new(name)\n  end\n\n  def greet?\n    true\n  end\nend\n\ndef main\n  Greeter.create('x')\nend\n";
        let file = SourceFile::new("/p/greeter.rb", Language::Ruby, content);
        let defs = RubyAdapter.index_symbols(&file);

        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Greeter", "create", "greet?", "main"]);
        assert_eq!(
            &content[defs[1].start_byte..defs[1].end_byte],
            "  def self.create(name)\n    new(name)\n  end\n"
        );
        assert!(content[defs[0].start_byte..defs[0].end_byte].ends_with("  end\nend\n"));
        assert_eq!(defs[3].end_byte, content.len());
    }

    #[test]
    fn test_receiver_calls_resolve_to_declaring_file() {
        let utils = SourceFile::new(
            "/p/string_utils.rb",
            Language::Ruby,
            "module StringUtils\n  def self.format_name(n)\n    n.strip\n  end\nend\n",
        );
        let other = SourceFile::new(
            "/p/a_other.rb",
            Language::Ruby,
            "def format_name(n)\n  n\nend\n",
        );
        let main = SourceFile::new(
            "/p/main.rb",
            Language::Ruby,
            "def main\n  puts StringUtils.format_name(ARGV[0])\n  cleanup\nend\n\ndef cleanup\nend\n",
        );
        let index = SymbolIndex::build(
            [&utils, &other, &main]
                .into_iter()
                .flat_map(|f| RubyAdapter.index_symbols(f)),
        );
        let ctx = CallContext { index: &index, imports: &[] };

        assert_eq!(
            RubyAdapter.extract_calls(&main, &ctx),
            vec![
                CallEdge::new("/p/main.rb::main", "/p/string_utils.rb::format_name"),
                CallEdge::new("/p/main.rb::main", "/p/main.rb::cleanup"),
            ]
        );
    }
}
