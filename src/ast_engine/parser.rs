//! Tree-sitter based structural parser.
//!
//! Produces the declaration tree of a file: imports, top-level functions,
//! classes and their methods, with visibility, parameter and return types.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};
use tree_sitter::{Node as TsNode, Parser};

use crate::ast_engine::languages::{get_language, get_node_types};
use crate::ir::{DistilledFile, Node, Parameter, Visibility};
use crate::processing::Language;
use crate::types::SourceFile;

/// Declaration role of a tree-sitter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Function,
    /// A variable declarator that becomes a function when bound to a
    /// function literal.
    Binding,
    Class,
    Import,
}

/// Node types whose contents are never declarations of the enclosing scope.
const OPAQUE: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
    "closure_expression",
    "lambda",
    "func_literal",
];

/// Function literal kinds a binding may hold.
const FUNCTION_LITERALS: &[&str] = &["arrow_function", "function", "function_expression", "generator_function"];

/// Fields holding an import's module reference, in lookup order.
const IMPORT_FIELDS: &[&str] = &["source", "module_name", "path", "argument", "name"];

/// Tree-sitter based structural parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructureParser;

impl StructureParser {
    pub fn new() -> Self {
        Self
    }

    /// Check if a language has a grammar.
    pub fn supports_language(&self, language: Language) -> bool {
        language.supports_structure()
    }

    /// Parse source code into a declaration tree.
    pub fn parse(&self, path: &str, content: &str, language: Language) -> Result<DistilledFile> {
        let name = language
            .tree_sitter_name()
            .ok_or_else(|| anyhow!("Language not supported: {}", language))?;

        // A parser is created per call; they are not shareable across threads.
        let mut parser = Parser::new();
        parser.set_language(&get_language(name)?)?;

        let tree = parser
            .parse(content.as_bytes(), None)
            .ok_or_else(|| anyhow!("Failed to parse {}", path))?;
        let root = tree.root_node();
        if root.has_error() {
            debug!(file = path, "Parse tree contains errors");
        }

        let walker = Walker {
            source: content,
            language,
            node_types: get_node_types(name),
        };
        let mut children = Vec::new();
        walker.collect(root, false, &mut children);

        Ok(DistilledFile::new(path, language).with_children(children))
    }

    /// Parse a loaded file. Languages without a grammar, and files the
    /// grammar rejects, yield an empty tree.
    pub fn parse_source(&self, source: &SourceFile) -> DistilledFile {
        let path = source.path.display().to_string();
        if !self.supports_language(source.language) {
            return DistilledFile::new(path, source.language);
        }
        match self.parse(&path, &source.content, source.language) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(file = %path, error = %e, "Structural parse failed");
                DistilledFile::new(path, source.language)
            }
        }
    }
}

struct Walker<'a> {
    source: &'a str,
    language: Language,
    node_types: HashMap<&'static str, NodeKind>,
}

impl<'a> Walker<'a> {
    fn text(&self, node: TsNode) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn kind_of(&self, node: TsNode) -> Option<NodeKind> {
        self.node_types.get(node.kind()).copied()
    }

    /// Collect top-level declarations below `node`.
    fn collect(&self, node: TsNode, exported: bool, out: &mut Vec<Node>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match self.kind_of(child) {
                Some(NodeKind::Function) => out.extend(self.function(child, exported)),
                Some(NodeKind::Binding) => out.extend(self.binding(child, exported)),
                Some(NodeKind::Class) => out.extend(self.class(child, exported)),
                Some(NodeKind::Import) => out.extend(self.import(child)),
                None if OPAQUE.contains(&child.kind()) => {}
                None => {
                    let exported = exported || child.kind() == "export_statement";
                    self.collect(child, exported, out);
                }
            }
        }
    }

    /// Collect the methods of a class body. Nested types are not members.
    fn members(&self, node: TsNode, out: &mut Vec<Node>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match self.kind_of(child) {
                Some(NodeKind::Function) => out.extend(self.function(child, false)),
                Some(_) => {}
                None if OPAQUE.contains(&child.kind()) => {}
                None => self.members(child, out),
            }
        }
    }

    fn class(&self, node: TsNode, exported: bool) -> Option<Node> {
        let name = match node.kind() {
            "impl_item" => {
                let target = self.text(node.child_by_field_name("type")?);
                target.split('<').next().unwrap_or(target).trim().to_string()
            }
            "type_spec" => {
                let ty = node.child_by_field_name("type")?;
                if !matches!(ty.kind(), "struct_type" | "interface_type") {
                    return None;
                }
                self.text(node.child_by_field_name("name")?).to_string()
            }
            _ => self.text(node.child_by_field_name("name")?).to_string(),
        };
        // Forward declarations and type references.
        if matches!(node.kind(), "struct_specifier" | "union_specifier" | "class_specifier")
            && node.child_by_field_name("body").is_none()
        {
            return None;
        }

        let mut children = Vec::new();
        self.members(node, &mut children);
        let visibility = if node.kind() == "impl_item" {
            Visibility::Default
        } else {
            self.visibility(node, &name, exported)
        };

        Some(Node::Class {
            name,
            visibility,
            children,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        })
    }

    fn function(&self, node: TsNode, exported: bool) -> Option<Node> {
        let (name, parameters) = match node.child_by_field_name("name") {
            Some(name) => (self.text(name).to_string(), node.child_by_field_name("parameters")),
            None => {
                let declarator = function_declarator(node)?;
                let name = self.text(declarator.child_by_field_name("declarator")?);
                let name = name.rsplit("::").next().unwrap_or(name).to_string();
                (name, declarator.child_by_field_name("parameters"))
            }
        };
        let return_type = ["return_type", "result", "type"]
            .iter()
            .find_map(|field| node.child_by_field_name(field))
            .map(|t| clean_type(self.text(t)))
            .filter(|t| !t.is_empty());

        Some(Node::Function {
            visibility: self.visibility(node, &name, exported),
            name,
            parameters: parameters.map(|p| self.parameters(p)).unwrap_or_default(),
            return_type,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        })
    }

    /// `const name = (...) => ...` and friends.
    fn binding(&self, node: TsNode, exported: bool) -> Option<Node> {
        let value = node.child_by_field_name("value")?;
        if !FUNCTION_LITERALS.contains(&value.kind()) {
            return None;
        }
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let parameters = match value.child_by_field_name("parameters") {
            Some(list) => self.parameters(list),
            None => value
                .child_by_field_name("parameter")
                .map(|p| vec![self.parameter(p)])
                .unwrap_or_default(),
        };
        let return_type = value
            .child_by_field_name("return_type")
            .map(|t| clean_type(self.text(t)));

        Some(Node::Function {
            visibility: self.visibility(node, &name, exported),
            name,
            parameters,
            return_type,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        })
    }

    fn import(&self, node: TsNode) -> Option<Node> {
        let raw = match IMPORT_FIELDS.iter().find_map(|f| node.child_by_field_name(f)) {
            Some(field) => self.text(field),
            None => self
                .text(node)
                .trim()
                .trim_end_matches(';')
                .split_whitespace()
                .last()?,
        };
        let module = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '<' | '>'))
            .to_string();
        if module.is_empty() {
            return None;
        }
        Some(Node::Import {
            module,
            line: node.start_position().row + 1,
        })
    }

    fn parameters(&self, list: TsNode) -> Vec<Parameter> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|p| !p.kind().contains("comment"))
            .map(|p| self.parameter(p))
            .collect()
    }

    fn parameter(&self, node: TsNode) -> Parameter {
        let name_node = ["name", "pattern", "declarator"]
            .iter()
            .find_map(|field| node.child_by_field_name(field))
            .or_else(|| first_identifier(node));
        let name = match name_node {
            Some(n) => self.text(n).to_string(),
            None if node.kind() == "identifier" => self.text(node).to_string(),
            None => String::new(),
        };
        let type_name = node
            .child_by_field_name("type")
            .map(|t| clean_type(self.text(t)))
            .filter(|t| !t.is_empty());
        Parameter { name, type_name }
    }

    fn visibility(&self, node: TsNode, name: &str, exported: bool) -> Visibility {
        match self.language {
            Language::Go => {
                if name.starts_with(|c: char| c.is_uppercase()) {
                    Visibility::Public
                } else {
                    Visibility::Private
                }
            }
            Language::Python | Language::Ruby => {
                if name.starts_with("__") && name.ends_with("__") {
                    Visibility::Public
                } else if name.starts_with('_') {
                    Visibility::Private
                } else {
                    Visibility::Default
                }
            }
            Language::Rust => {
                if has_child(node, "visibility_modifier") {
                    Visibility::Public
                } else {
                    Visibility::Private
                }
            }
            Language::C | Language::Cpp => match self.modifier_words(node, "storage_class_specifier") {
                Some(words) if words.contains(&"static") => Visibility::Private,
                _ => Visibility::Default,
            },
            _ => {
                if exported {
                    return Visibility::Public;
                }
                if name.starts_with('#') {
                    return Visibility::Private;
                }
                let words = self
                    .modifier_words(node, "modifiers")
                    .or_else(|| self.modifier_words(node, "accessibility_modifier"))
                    .unwrap_or_default();
                if words.contains(&"private") {
                    Visibility::Private
                } else if words.contains(&"protected") {
                    Visibility::Protected
                } else if words.contains(&"internal") {
                    Visibility::Internal
                } else if words.contains(&"public") {
                    Visibility::Public
                } else {
                    Visibility::Default
                }
            }
        }
    }

    /// Words of the first child of `kind`.
    fn modifier_words(&self, node: TsNode, kind: &str) -> Option<Vec<&'a str>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| c.kind() == kind)?;
        Some(self.text(found).split_whitespace().collect())
    }
}

fn has_child(node: TsNode, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

fn first_identifier(node: TsNode) -> Option<TsNode> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == "identifier");
    found
}

/// Follow C declarators down to the function declarator.
fn function_declarator(node: TsNode) -> Option<TsNode> {
    let mut current = node.child_by_field_name("declarator")?;
    while current.kind() != "function_declarator" {
        current = current.child_by_field_name("declarator")?;
    }
    Some(current)
}

fn clean_type(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(':')
        .trim_start_matches("->")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(content: &str, language: Language) -> DistilledFile {
        StructureParser::new().parse("/p/file", content, language).unwrap()
    }

    fn summary(nodes: &[Node]) -> Vec<(String, Visibility)> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Function { name, visibility, .. } | Node::Class { name, visibility, .. } => {
                    Some((name.clone(), *visibility))
                }
                _ => None,
            })
            .collect()
    }

    fn imports(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Import { module, .. } => Some(module.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_python() {
        let code = r#"import os
from .util import helper

def main(cfg: Config) -> int:
    return helper(cfg)

def _private():
    pass

class Service:
    def __init__(self):
        pass

    @staticmethod
    def run(x: int) -> Report:
        pass
"#;
        let file = parse(code, Language::Python);

        assert_eq!(imports(&file.children), vec!["os", ".util"]);
        assert_eq!(
            summary(&file.children),
            vec![
                ("main".to_string(), Visibility::Default),
                ("_private".to_string(), Visibility::Private),
                ("Service".to_string(), Visibility::Default),
            ]
        );

        let main = file.children.iter().find(|n| n.name() == Some("main")).unwrap();
        assert_eq!(main.referenced_types(), vec!["Config"]);

        let Some(Node::Class { children, .. }) = file.children.iter().find(|n| n.name() == Some("Service"))
        else {
            panic!("class not found");
        };
        assert_eq!(
            summary(children),
            vec![
                ("__init__".to_string(), Visibility::Public),
                ("run".to_string(), Visibility::Default),
            ]
        );
        assert_eq!(children[1].referenced_types(), vec!["Report"]);
    }

    #[test]
    fn test_parse_rust() {
        let code = r#"use crate::model::Point;

pub fn main() {}

fn helper(p: Point) -> Option<Point> {
    None
}

pub struct Point {
    x: i32,
}

impl Point {
    pub fn new(x: i32) -> Self {
        Point { x }
    }
}
"#;
        let file = parse(code, Language::Rust);

        assert_eq!(imports(&file.children), vec!["crate::model::Point"]);
        assert_eq!(
            summary(&file.children),
            vec![
                ("main".to_string(), Visibility::Public),
                ("helper".to_string(), Visibility::Private),
                ("Point".to_string(), Visibility::Public),
                ("Point".to_string(), Visibility::Default),
            ]
        );
        let Some(Node::Class { children, .. }) = file.children.last() else {
            panic!("impl not found");
        };
        assert_eq!(summary(children), vec![("new".to_string(), Visibility::Public)]);
    }

    #[test]
    fn test_parse_go_capitalization() {
        let code = r#"package main

import (
	"fmt"
	"./util"
)

type Server struct {
	port int
}

func (s *Server) Start() error {
	return nil
}

func helper() {}
"#;
        let file = parse(code, Language::Go);

        assert_eq!(imports(&file.children), vec!["fmt", "./util"]);
        assert_eq!(
            summary(&file.children),
            vec![
                ("Server".to_string(), Visibility::Public),
                ("Start".to_string(), Visibility::Public),
                ("helper".to_string(), Visibility::Private),
            ]
        );
    }

    #[test]
    fn test_parse_javascript_exports() {
        let code = r#"import { helper } from './util';

export const run = (x) => helper(x);

function main() {
  run(1);
}

class Widget {
  constructor() {}
  #secret() {}
  render() {}
}
"#;
        let file = parse(code, Language::JavaScript);

        assert_eq!(imports(&file.children), vec!["./util"]);
        assert_eq!(
            summary(&file.children),
            vec![
                ("run".to_string(), Visibility::Public),
                ("main".to_string(), Visibility::Default),
                ("Widget".to_string(), Visibility::Default),
            ]
        );
        let Some(Node::Class { children, .. }) = file.children.last() else {
            panic!("class not found");
        };
        assert_eq!(
            summary(children),
            vec![
                ("constructor".to_string(), Visibility::Default),
                ("#secret".to_string(), Visibility::Private),
                ("render".to_string(), Visibility::Default),
            ]
        );
    }

    #[test]
    fn test_parse_java_modifiers() {
        let code = r#"import java.util.List;

public class App {
    private int count;

    public static void main(String[] args) {}

    private Helper build(List<String> items) {
        return null;
    }
}
"#;
        let file = parse(code, Language::Java);

        assert_eq!(imports(&file.children), vec!["java.util.List"]);
        let Some(Node::Class { name, visibility, children, .. }) = file.children.last() else {
            panic!("class not found");
        };
        assert_eq!(name, "App");
        assert_eq!(*visibility, Visibility::Public);
        assert_eq!(
            summary(children),
            vec![
                ("main".to_string(), Visibility::Public),
                ("build".to_string(), Visibility::Private),
            ]
        );
        assert_eq!(children[1].referenced_types(), vec!["Helper"]);
    }

    #[test]
    fn test_parse_c_static() {
        let code = "#include \"util.h\"\n\nstatic int helper(int x) { return x; }\n\nint main(void) { return helper(1); }\n";
        let file = parse(code, Language::C);

        assert_eq!(imports(&file.children), vec!["util.h"]);
        assert_eq!(
            summary(&file.children),
            vec![
                ("helper".to_string(), Visibility::Private),
                ("main".to_string(), Visibility::Default),
            ]
        );
    }

    #[test]
    fn test_unsupported_language() {
        let parser = StructureParser::new();
        assert!(parser.parse("/p/a.kt", "fun main() {}", Language::Kotlin).is_err());

        let source = SourceFile::new("/p/a.kt", Language::Kotlin, "fun main() {}");
        let tree = parser.parse_source(&source);
        assert_eq!(tree.path, "/p/a.kt");
        assert!(tree.children.is_empty());
    }
}
