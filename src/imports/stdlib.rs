//! Standard-library tables for import classification.
//!
//! Module references that name a language's standard library are never
//! looked up on disk.

use std::collections::{HashMap, HashSet};

use crate::processing::Language;

/// Type of dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyType {
    /// Standard library import.
    StandardLib,
    /// Third-party/external package.
    External,
    /// Internal/local module.
    Internal,
    /// Relative import (same package).
    Relative,
}

lazy_static::lazy_static! {
    static ref STANDARD_LIBRARY: StandardLibrary = StandardLibrary::new();
}

/// Per-language standard library module names and prefixes.
pub struct StandardLibrary {
    modules: HashMap<Language, HashSet<&'static str>>,
    prefixes: HashMap<Language, &'static [&'static str]>,
}

impl Default for StandardLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardLibrary {
    pub fn new() -> Self {
        let mut modules = HashMap::new();

        // Python standard library (common modules)
        modules.insert(
            Language::Python,
            [
                "os", "sys", "re", "json", "time", "datetime", "typing", "collections",
                "itertools", "functools", "pathlib", "urllib", "http", "math", "random",
                "string", "io", "csv", "xml", "sqlite3", "threading", "multiprocessing",
                "subprocess", "logging", "unittest", "argparse", "configparser", "email",
                "html", "abc",
            ]
            .into_iter()
            .collect(),
        );

        // Go standard library
        modules.insert(
            Language::Go,
            [
                "fmt", "os", "io", "strings", "strconv", "time", "net", "net/http",
                "encoding/json", "path", "path/filepath", "regexp", "sort", "sync",
                "context", "errors", "log", "math", "crypto", "database/sql", "html",
                "bufio", "bytes", "container", "flag",
            ]
            .into_iter()
            .collect(),
        );

        // JavaScript/TypeScript built-ins (Node.js)
        let node: HashSet<&'static str> = [
            "fs", "path", "os", "util", "events", "stream", "http", "https", "url",
            "crypto", "buffer", "process", "child_process", "cluster", "net", "dgram",
            "dns", "tls", "readline", "zlib", "assert", "querystring", "string_decoder",
        ]
        .into_iter()
        .collect();
        modules.insert(Language::JavaScript, node.clone());
        modules.insert(Language::TypeScript, node);

        // Ruby standard library
        modules.insert(
            Language::Ruby,
            [
                "json", "yaml", "csv", "uri", "net", "open-uri", "fileutils", "pathname",
                "digest", "base64", "time", "date", "logger", "optparse", "ostruct", "set",
                "singleton", "tempfile", "thread", "timeout", "zlib", "stringio", "erb",
                "cgi", "webrick", "socket",
            ]
            .into_iter()
            .collect(),
        );

        // Rust standard crates
        modules.insert(
            Language::Rust,
            ["std", "core", "alloc", "proc_macro"].into_iter().collect(),
        );

        let mut prefixes: HashMap<Language, &'static [&'static str]> = HashMap::new();
        prefixes.insert(
            Language::Java,
            &["java.", "javax.", "org.w3c.", "org.xml.", "org.ietf.jgss."],
        );
        prefixes.insert(Language::CSharp, &["System", "Microsoft", "Windows"]);
        prefixes.insert(Language::Kotlin, &["kotlin.", "java.", "android.", "kotlinx."]);

        Self { modules, prefixes }
    }

    /// Shared instance.
    pub fn global() -> &'static StandardLibrary {
        &STANDARD_LIBRARY
    }

    /// Whether `module` belongs to the standard library of `language`.
    pub fn contains(&self, language: Language, module: &str) -> bool {
        if let Some(prefixes) = self.prefixes.get(&language) {
            return prefixes.iter().any(|p| module.starts_with(p));
        }

        let Some(table) = self.modules.get(&language) else {
            return false;
        };

        match language {
            Language::Go => table.contains(module) || !module.contains('.'),
            Language::Python => {
                let root = module.split('.').next().unwrap_or(module);
                table.contains(root)
            }
            Language::Rust => {
                let root = module.split("::").next().unwrap_or(module);
                table.contains(root)
            }
            _ => table.contains(module),
        }
    }

    /// Classify a module reference.
    pub fn classify(&self, language: Language, module: &str) -> DependencyType {
        if module.starts_with('.') {
            return DependencyType::Relative;
        }
        if language == Language::Rust
            && matches!(
                module.split("::").next(),
                Some("crate") | Some("self") | Some("super")
            )
        {
            return DependencyType::Internal;
        }
        if self.contains(language, module) {
            return DependencyType::StandardLib;
        }
        DependencyType::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_stdlib_detection() {
        let std = StandardLibrary::new();

        assert_eq!(std.classify(Language::Python, "os"), DependencyType::StandardLib);
        assert_eq!(std.classify(Language::Python, "os.path"), DependencyType::StandardLib);
        assert_eq!(std.classify(Language::Python, "requests"), DependencyType::External);
        assert_eq!(std.classify(Language::Python, ".utils"), DependencyType::Relative);
    }

    #[test]
    fn test_go_paths_without_dot_are_std() {
        let std = StandardLibrary::global();

        assert!(std.contains(Language::Go, "net/http"));
        assert!(std.contains(Language::Go, "golang_internal"));
        assert!(!std.contains(Language::Go, "github.com/acme/lib"));
        assert_eq!(std.classify(Language::Go, "./util"), DependencyType::Relative);
    }

    #[test]
    fn test_prefix_languages() {
        let std = StandardLibrary::global();

        assert!(std.contains(Language::Java, "java.util.List"));
        assert!(!std.contains(Language::Java, "com.acme.Service"));
        assert!(std.contains(Language::CSharp, "System.Collections.Generic"));
        assert!(std.contains(Language::Kotlin, "kotlinx.coroutines.launch"));
        assert!(!std.contains(Language::Kotlin, "com.acme.Repo"));
    }

    #[test]
    fn test_rust_crates() {
        let std = StandardLibrary::global();

        assert_eq!(std.classify(Language::Rust, "std::fmt"), DependencyType::StandardLib);
        assert_eq!(std.classify(Language::Rust, "crate::util"), DependencyType::Internal);
        assert_eq!(std.classify(Language::Rust, "serde"), DependencyType::External);
    }

    #[test]
    fn test_scoped_package_detection() {
        let std = StandardLibrary::global();

        assert_eq!(std.classify(Language::JavaScript, "@babel/core"), DependencyType::External);
        assert_eq!(std.classify(Language::JavaScript, "fs"), DependencyType::StandardLib);
        assert_eq!(std.classify(Language::TypeScript, "./lib"), DependencyType::Relative);
    }
}
