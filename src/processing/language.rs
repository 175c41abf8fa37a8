//! Language classification.
//!
//! Maps a file path (and, for extension-less scripts, the shebang line) to a
//! language tag. Only the extension decides for regular source files.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Languages known to the distiller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Php,
    Python,
    Go,
    JavaScript,
    TypeScript,
    Ruby,
    Java,
    CSharp,
    Rust,
    Swift,
    Kotlin,
    Cpp,
    C,
    Unknown,
}

impl Language {
    /// Every known language except `Unknown`.
    pub const ALL: [Language; 13] = [
        Language::Php,
        Language::Python,
        Language::Go,
        Language::JavaScript,
        Language::TypeScript,
        Language::Ruby,
        Language::Java,
        Language::CSharp,
        Language::Rust,
        Language::Swift,
        Language::Kotlin,
        Language::Cpp,
        Language::C,
    ];

    /// Get the tree-sitter grammar name for this language.
    pub fn tree_sitter_name(&self) -> Option<&'static str> {
        match self {
            Language::Python => Some("python"),
            Language::JavaScript => Some("javascript"),
            Language::TypeScript => Some("typescript"),
            Language::Go => Some("go"),
            Language::Rust => Some("rust"),
            Language::Java => Some("java"),
            Language::C => Some("c"),
            Language::Cpp => Some("cpp"),
            Language::Ruby => Some("ruby"),
            _ => None,
        }
    }

    /// Whether a structural tree can be derived for this language.
    pub fn supports_structure(&self) -> bool {
        self.tree_sitter_name().is_some()
    }

    /// Whether a language adapter exists for import, symbol and call scanning.
    pub fn supports_dependency_analysis(&self) -> bool {
        crate::adapters::adapter_for(*self).is_some()
    }

    /// Get the language from a string identifier.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "php" => Language::Php,
            "python" | "py" => Language::Python,
            "go" | "golang" => Language::Go,
            "javascript" | "js" | "jsx" => Language::JavaScript,
            "typescript" | "ts" | "tsx" => Language::TypeScript,
            "ruby" | "rb" => Language::Ruby,
            "java" => Language::Java,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "rust" | "rs" => Language::Rust,
            "swift" => Language::Swift,
            "kotlin" | "kt" => Language::Kotlin,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            "c" => Language::C,
            _ => Language::Unknown,
        }
    }

    /// Get a string representation of the language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Php => "php",
            Language::Python => "python",
            Language::Go => "go",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Ruby => "ruby",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Rust => "rust",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about a detected language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageInfo {
    /// The detected language.
    pub language: Language,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl LanguageInfo {
    pub fn new(language: Language, confidence: f32) -> Self {
        Self {
            language,
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new(Language::Unknown, 0.0)
    }
}

/// Language detector using extension and shebang analysis.
pub struct LanguageDetector {
    extension_map: HashMap<&'static str, Language>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    /// Create a new language detector with default mappings.
    pub fn new() -> Self {
        let mut extension_map = HashMap::new();

        let table: &[(&[&'static str], Language)] = &[
            (&["php"], Language::Php),
            (&["py"], Language::Python),
            (&["go"], Language::Go),
            (&["js", "mjs", "cjs", "jsx"], Language::JavaScript),
            (&["ts", "tsx"], Language::TypeScript),
            (&["rb"], Language::Ruby),
            (&["java"], Language::Java),
            (&["cs"], Language::CSharp),
            (&["rs"], Language::Rust),
            (&["swift"], Language::Swift),
            (&["kt", "kts"], Language::Kotlin),
            (
                &["cpp", "cc", "cxx", "c++", "h", "hpp", "hxx", "h++"],
                Language::Cpp,
            ),
            (&["c"], Language::C),
        ];

        for (extensions, language) in table {
            for ext in *extensions {
                extension_map.insert(*ext, *language);
            }
        }

        Self { extension_map }
    }

    /// Classify a path by its extension alone.
    pub fn classify(&self, path: &Path) -> Language {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.extension_map.get(e.to_lowercase().as_str()).copied())
            .unwrap_or(Language::Unknown)
    }

    /// Detect language from file path and optional content.
    pub fn detect(&self, path: &Path, content: Option<&str>) -> LanguageInfo {
        let language = self.classify(path);
        if language != Language::Unknown {
            return LanguageInfo::new(language, 1.0);
        }

        // Extension-less scripts
        if path.extension().is_none() {
            if let Some(first_line) = content.and_then(|c| c.lines().next()) {
                if first_line.starts_with("#!") {
                    return self.detect_from_shebang(first_line);
                }
            }
        }

        LanguageInfo::unknown()
    }

    /// Detect language from shebang line.
    fn detect_from_shebang(&self, shebang: &str) -> LanguageInfo {
        let lower = shebang.to_lowercase();

        if lower.contains("python") {
            LanguageInfo::new(Language::Python, 0.95)
        } else if lower.contains("node") || lower.contains("deno") {
            LanguageInfo::new(Language::JavaScript, 0.95)
        } else if lower.contains("ruby") {
            LanguageInfo::new(Language::Ruby, 0.95)
        } else if lower.contains("php") {
            LanguageInfo::new(Language::Php, 0.95)
        } else {
            LanguageInfo::unknown()
        }
    }
}

lazy_static::lazy_static! {
    static ref DETECTOR: LanguageDetector = LanguageDetector::new();
}

/// Classify a path with the default detector.
pub fn classify(path: &Path) -> Language {
    DETECTOR.classify(path)
}

/// Detect a language with the default detector, falling back to the shebang.
pub fn detect(path: &Path, content: Option<&str>) -> LanguageInfo {
    DETECTOR.detect(path, content)
}
