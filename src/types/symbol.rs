//! Symbol definitions, snippets and call edges.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::processing::Language;

/// Kind of an indexed definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
        }
    }
}

/// A definition found by a language adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// Local name (`helper`, `Point::new`).
    pub name: String,
    /// `path::name`
    pub fqn: String,
    /// Absolute path of the declaring file.
    pub file_path: PathBuf,
    /// Offset of the first byte of the header line.
    pub start_byte: usize,
    /// Offset one past the estimated end of the body.
    pub end_byte: usize,
    pub language: Language,
    pub kind: SymbolKind,
    /// Non-primitive parameter and return type names from the header.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signature_types: Vec<String>,
}

impl SymbolDefinition {
    /// Last path segment of the name (`new` for `Point::new`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Byte length of the definition.
    pub fn byte_length(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }
}

/// Reference into one source file's content, copied only at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub start_byte: usize,
    pub end_byte: usize,
    pub fqn: String,
    pub kind: SymbolKind,
}

impl From<&SymbolDefinition> for CodeSnippet {
    fn from(def: &SymbolDefinition) -> Self {
        Self {
            start_byte: def.start_byte,
            end_byte: def.end_byte,
            fqn: def.fqn.clone(),
            kind: def.kind,
        }
    }
}

/// Directed call edge between two fully-qualified names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}
