//! Declaration tree nodes.

use serde::{Deserialize, Serialize};

use crate::processing::Language;

/// Declared visibility of a function or class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    /// No modifier and no naming convention applies.
    #[default]
    Default,
}

impl Visibility {
    /// Public or unmarked declarations are candidate entry points.
    pub fn is_exposed(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::Default)
    }
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// A node of the declaration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Import {
        module: String,
        line: usize,
    },
    Class {
        name: String,
        visibility: Visibility,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
        line_start: usize,
        line_end: usize,
    },
    Function {
        name: String,
        visibility: Visibility,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<String>,
        line_start: usize,
        line_end: usize,
    },
    /// Free text; `format` is `line`, `block`, `doc` or `implementation`.
    Comment {
        text: String,
        format: String,
        line: usize,
    },
}

impl Node {
    /// Build a function node without parameters.
    pub fn function(name: impl Into<String>, visibility: Visibility) -> Self {
        Node::Function {
            name: name.into(),
            visibility,
            parameters: Vec::new(),
            return_type: None,
            line_start: 0,
            line_end: 0,
        }
    }

    /// Build a class node with the given members.
    pub fn class(name: impl Into<String>, visibility: Visibility, children: Vec<Node>) -> Self {
        Node::Class {
            name: name.into(),
            visibility,
            children,
            line_start: 0,
            line_end: 0,
        }
    }

    /// Name of a function or class node.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Function { name, .. } | Node::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Non-primitive parameter and return types of a function node.
    pub fn referenced_types(&self) -> Vec<String> {
        match self {
            Node::Function {
                parameters,
                return_type,
                ..
            } => parameters
                .iter()
                .filter_map(|p| p.type_name.as_deref())
                .chain(return_type.as_deref())
                .flat_map(crate::adapters::signature::type_names)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Declaration tree of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistilledFile {
    pub path: String,
    pub language: Language,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl DistilledFile {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Count of function and class nodes, including class members.
    pub fn declaration_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Function { .. } => 1,
                    Node::Class { children, .. } => 1 + count(children),
                    _ => 0,
                })
                .sum()
        }
        count(&self.children)
    }
}
