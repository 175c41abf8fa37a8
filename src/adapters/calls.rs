//! Call-site scanning shared by the language adapters.
//!
//! Calls are attributed to the innermost indexed definition whose byte range
//! contains the line. Tokens are matched against the global index, so the
//! result is approximate: `obj.method()` resolves by method name alone unless
//! the receiver names a file that declares the method.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use regex::Regex;

use super::blocks::{self, Line};
use super::CallContext;
use crate::processing::Language;
use crate::types::{CallEdge, SourceFile, SymbolDefinition, SymbolKind};

/// How call sites are recognized on a line.
#[derive(Clone, Copy)]
pub enum CallStyle {
    /// Every identifier on a line containing `(` is a candidate callee.
    Words,
    /// `Recv.method(`, `Type::method(` and bare `name(` call sites. The
    /// receiver is mapped to candidate file names declaring it.
    Receivers {
        receiver_files: fn(&str) -> Vec<String>,
        /// Ruby-style calls without parentheses.
        paren_free: bool,
    },
}

/// Per-language scanning rules.
#[derive(Clone, Copy)]
pub struct ScanRules {
    pub comment_prefixes: &'static [&'static str],
    pub style: CallStyle,
}

lazy_static::lazy_static! {
    static ref RECEIVER_CALL: Regex =
        Regex::new(r"([A-Za-z_]\w*)\s*(?:\.|::|->)\s*([A-Za-z_]\w*[?!]?)\s*\(").unwrap();
    static ref RECEIVER_ACCESS: Regex =
        Regex::new(r"([A-Za-z_]\w*)\.([A-Za-z_]\w*[?!]?)").unwrap();
    static ref BARE_CALL: Regex = Regex::new(r"\b([A-Za-z_]\w*[?!]?)\s*\(").unwrap();
    static ref COMMAND_CALL: Regex =
        Regex::new(r#"\b([a-z_]\w*[?!]?)\s+[\w"'\[\{:@]"#).unwrap();
    static ref LONE_CALL: Regex = Regex::new(r"^\s*([a-z_]\w*[?!]?)\s*$").unwrap();

    static ref STOP_WORDS: HashMap<Language, HashSet<&'static str>> = {
        let mut map = HashMap::new();
        map.insert(Language::Python, set(&[
            "def", "class", "return", "if", "elif", "else", "for", "while", "in", "is", "not",
            "and", "or", "with", "as", "try", "except", "finally", "raise", "import", "from",
            "pass", "lambda", "yield", "await", "async", "self", "cls", "None", "True", "False",
            "print", "len", "range", "str", "int", "float", "dict", "list", "set", "tuple",
            "isinstance", "super", "open", "enumerate", "zip", "map", "filter", "sorted",
        ]));
        map.insert(Language::Go, set(&[
            "func", "return", "if", "else", "for", "range", "switch", "case", "default", "go",
            "defer", "select", "type", "struct", "interface", "var", "const", "package",
            "import", "make", "new", "len", "cap", "append", "copy", "delete", "panic",
            "recover", "nil", "true", "false", "err", "error", "string", "int", "fmt",
            "Println", "Printf", "Sprintf", "Errorf",
        ]));
        let js = set(&[
            "function", "return", "if", "else", "for", "while", "do", "switch", "case",
            "default", "new", "typeof", "instanceof", "const", "let", "var", "this", "class",
            "extends", "super", "import", "export", "from", "async", "await", "null",
            "undefined", "true", "false", "console", "log", "error", "require", "catch",
            "try", "throw", "then", "push", "map", "filter", "forEach", "JSON", "Object",
            "Array", "Promise", "String", "Number", "Math",
        ]);
        map.insert(Language::JavaScript, js.clone());
        map.insert(Language::TypeScript, js);
        map.insert(Language::Php, set(&[
            "function", "return", "if", "else", "elseif", "foreach", "for", "while", "as",
            "echo", "print", "array", "isset", "unset", "empty", "count", "strlen", "new",
            "null", "true", "false", "this", "self", "parent", "static", "public", "private",
            "protected", "class", "require_once", "require", "include", "include_once",
        ]));
        map.insert(Language::Ruby, set(&[
            "if", "unless", "while", "until", "for", "case", "when", "begin", "rescue",
            "ensure", "end", "class", "module", "def", "return", "yield", "puts", "print", "p",
            "require", "include", "extend", "attr_reader", "attr_writer", "attr_accessor",
            "new", "nil", "true", "false", "self", "super", "and", "or", "not", "length",
            "size", "empty", "strip", "map", "select", "reject", "sum", "inspect",
        ]));
        map.insert(Language::Java, set(&[
            "if", "else", "while", "for", "do", "switch", "case", "default", "try", "catch",
            "finally", "throw", "throws", "return", "break", "continue", "class", "interface",
            "extends", "implements", "public", "private", "protected", "static", "final",
            "abstract", "synchronized", "volatile", "new", "this", "super", "null", "true",
            "false", "import", "package", "System", "String", "Integer", "Boolean",
            "println", "print", "length", "size", "get", "put", "add", "remove", "contains",
            "toString", "equals", "hashCode",
        ]));
        map.insert(Language::CSharp, set(&[
            "if", "else", "while", "for", "foreach", "do", "switch", "case", "default", "try",
            "catch", "finally", "throw", "return", "break", "continue", "goto", "class",
            "interface", "struct", "enum", "public", "private", "protected", "internal",
            "static", "readonly", "const", "virtual", "override", "abstract", "sealed",
            "partial", "new", "this", "base", "null", "true", "false", "using", "namespace",
            "var", "Console", "string", "int", "bool", "object", "WriteLine", "Write",
            "ToString", "Equals", "GetHashCode", "Count", "Length", "Add", "Remove",
            "Contains", "Clear",
        ]));
        map.insert(Language::Rust, set(&[
            "if", "else", "while", "for", "loop", "match", "return", "break", "continue",
            "let", "mut", "const", "static", "fn", "struct", "enum", "trait", "impl", "use",
            "mod", "pub", "crate", "super", "self", "Self", "extern", "unsafe", "async",
            "await", "move", "ref", "dyn", "where", "type", "as", "in", "println", "print",
            "panic", "assert", "vec", "format", "Some", "None", "Ok", "Err",
        ]));
        map.insert(Language::Swift, set(&[
            "if", "else", "while", "for", "switch", "case", "default", "return", "break",
            "continue", "let", "var", "func", "class", "struct", "enum", "protocol",
            "extension", "init", "deinit", "import", "public", "private", "internal", "open",
            "fileprivate", "static", "final", "override", "required", "convenience", "lazy",
            "weak", "strong", "unowned", "guard", "defer", "repeat", "where", "as", "is",
            "try", "catch", "throw", "throws", "async", "await", "actor", "isolated",
            "nonisolated", "self", "print", "assert", "fatalError", "precondition",
            "debugPrint",
        ]));
        let cpp = set(&[
            "if", "else", "while", "for", "do", "switch", "case", "default", "return", "break",
            "continue", "auto", "bool", "char", "double", "float", "int", "long", "short",
            "signed", "unsigned", "void", "class", "struct", "enum", "union", "typedef",
            "typename", "template", "namespace", "using", "public", "private", "protected",
            "virtual", "static", "const", "mutable", "inline", "extern", "new", "delete",
            "this", "operator", "sizeof", "typeid", "const_cast", "dynamic_cast",
            "reinterpret_cast", "static_cast", "try", "catch", "throw", "friend", "explicit",
            "std", "cout", "cin", "endl", "printf", "scanf", "malloc", "free", "strlen",
            "strcpy", "strcmp",
        ]);
        map.insert(Language::Cpp, cpp.clone());
        map.insert(Language::C, cpp);
        map.insert(Language::Kotlin, set(&[
            "if", "else", "when", "while", "for", "do", "return", "break", "continue", "fun",
            "val", "var", "class", "object", "interface", "package", "import", "this",
            "super", "null", "true", "false", "is", "as", "in", "try", "catch", "finally",
            "throw", "println", "print", "listOf", "mapOf", "setOf", "mutableListOf",
            "mutableMapOf", "require", "check", "let", "also", "apply", "run", "with",
        ]));
        map
    };
}

fn set(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// Whether `word` is a keyword or common library call for `language`.
pub fn is_stop_word(language: Language, word: &str) -> bool {
    STOP_WORDS
        .get(&language)
        .map(|words| words.contains(word))
        .unwrap_or(false)
}

/// Tracks the innermost definition enclosing the current line.
struct Enclosing<'a> {
    pending: std::iter::Peekable<std::vec::IntoIter<&'a SymbolDefinition>>,
    open: Vec<&'a SymbolDefinition>,
}

impl<'a> Enclosing<'a> {
    fn new(mut definitions: Vec<&'a SymbolDefinition>) -> Self {
        definitions.sort_by_key(|d| (d.start_byte, std::cmp::Reverse(d.end_byte)));
        Self {
            pending: definitions.into_iter().peekable(),
            open: Vec::new(),
        }
    }

    /// Advance to `line`; returns the enclosing definition and whether the
    /// line is a definition header.
    fn advance(&mut self, line: &Line<'_>) -> (Option<&'a SymbolDefinition>, bool) {
        let mut header = false;
        while let Some(next) = self.pending.peek() {
            if next.start_byte >= line.end {
                break;
            }
            header |= next.start_byte >= line.start;
            let next = *next;
            self.pending.next();
            self.open.push(next);
        }
        while let Some(top) = self.open.last() {
            if top.end_byte <= line.start {
                self.open.pop();
            } else {
                break;
            }
        }
        (self.open.last().copied(), header)
    }
}

/// Scan a file for call sites and resolve them against the index.
pub fn scan_calls(file: &SourceFile, ctx: &CallContext<'_>, rules: &ScanRules) -> Vec<CallEdge> {
    let definitions: Vec<&SymbolDefinition> = ctx
        .index
        .definitions_in(&file.path)
        .filter(|d| d.kind == SymbolKind::Function)
        .collect();
    let mut enclosing = Enclosing::new(definitions);
    let mut edges = Vec::new();

    for line in blocks::lines(&file.content) {
        let (current, is_header) = enclosing.advance(&line);
        let Some(current) = current else {
            continue;
        };
        let trimmed = line.trimmed();
        if is_header
            || trimmed.is_empty()
            || rules.comment_prefixes.iter().any(|p| trimmed.starts_with(p))
        {
            continue;
        }

        let mut scan = LineScan {
            file,
            ctx,
            caller: &current.fqn,
            edges: &mut edges,
        };
        match rules.style {
            CallStyle::Words => scan.words(trimmed),
            CallStyle::Receivers {
                receiver_files,
                paren_free,
            } => scan.receivers(trimmed, receiver_files, paren_free),
        }
    }

    edges
}

struct LineScan<'a, 'b> {
    file: &'a SourceFile,
    ctx: &'a CallContext<'a>,
    caller: &'a str,
    edges: &'b mut Vec<CallEdge>,
}

impl LineScan<'_, '_> {
    fn stop(&self, word: &str) -> bool {
        is_stop_word(self.file.language, word)
    }

    fn link_bare(&mut self, name: &str) {
        if self.stop(name) {
            return;
        }
        if let Some(def) = self.ctx.index.resolve(name, &self.file.path, self.ctx.imports) {
            self.edges.push(CallEdge::new(self.caller, def.fqn.clone()));
        }
    }

    fn words(&mut self, line: &str) {
        if !line.contains('(') {
            return;
        }
        for word in line.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
            if word.is_empty() || word.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            self.link_bare(word);
        }
    }

    fn receivers(&mut self, line: &str, receiver_files: fn(&str) -> Vec<String>, paren_free: bool) {
        let receiver_pattern: &Regex = if paren_free {
            &*RECEIVER_ACCESS
        } else {
            &*RECEIVER_CALL
        };

        let mut consumed: Vec<Range<usize>> = Vec::new();
        for caps in receiver_pattern.captures_iter(line) {
            let (Some(recv), Some(method)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            consumed.push(recv.start()..method.end());
            self.link_receiver(recv.as_str(), method.as_str(), receiver_files);
        }

        let mut bare: Vec<&Regex> = vec![&*BARE_CALL];
        if paren_free {
            bare.push(&*COMMAND_CALL);
            bare.push(&*LONE_CALL);
        }
        for pattern in bare {
            for caps in pattern.captures_iter(line) {
                let Some(name) = caps.get(1) else {
                    continue;
                };
                if consumed.iter().any(|r| r.contains(&name.start())) {
                    continue;
                }
                consumed.push(name.range());
                self.link_bare(name.as_str());
            }
        }
    }

    fn link_receiver(&mut self, recv: &str, method: &str, receiver_files: fn(&str) -> Vec<String>) {
        if self.stop(method) {
            return;
        }

        if !self.stop(recv) {
            let candidates = receiver_files(recv);
            let index = self.ctx.index;
            if let Some(target) = index.find_file_named(&candidates, &self.file.path, self.ctx.imports) {
                let qualified = format!("{}::{}", recv, method);
                let found = index
                    .lookup_in(target, &qualified)
                    .or_else(|| index.lookup_in(target, method))
                    .filter(|d| d.kind == SymbolKind::Function);
                if let Some(def) = found {
                    self.edges.push(CallEdge::new(self.caller, def.fqn.clone()));
                    return;
                }
            }
        }

        self.link_bare(method);
    }
}

/// `DataHandler` -> `data_handler`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("DataHandler"), "data_handler");
        assert_eq!(snake_case("Utils"), "utils");
        assert_eq!(snake_case("processor"), "processor");
    }

    #[test]
    fn test_stop_words() {
        assert!(is_stop_word(Language::Java, "println"));
        assert!(is_stop_word(Language::Ruby, "puts"));
        assert!(!is_stop_word(Language::Python, "helper"));
        assert!(!is_stop_word(Language::Unknown, "if"));
    }
}
