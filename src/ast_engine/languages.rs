//! Language-specific node type mappings for structural parsing.
//!
//! Maps tree-sitter node types to the declaration roles the parser turns
//! into tree nodes. Node types without a mapping are walked through.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::ast_engine::parser::NodeKind;

/// Get the tree-sitter grammar for a grammar name.
pub fn get_language(name: &str) -> Result<tree_sitter::Language> {
    match name {
        "python" => Ok(tree_sitter_python::language()),
        "javascript" => Ok(tree_sitter_javascript::language()),
        "typescript" => Ok(tree_sitter_typescript::language_typescript()),
        "tsx" => Ok(tree_sitter_typescript::language_tsx()),
        "go" => Ok(tree_sitter_go::language()),
        "rust" => Ok(tree_sitter_rust::language()),
        "java" => Ok(tree_sitter_java::language()),
        "c" => Ok(tree_sitter_c::language()),
        "cpp" => Ok(tree_sitter_cpp::language()),
        "ruby" => Ok(tree_sitter_ruby::language()),
        _ => Err(anyhow!("Language not supported: {}", name)),
    }
}

/// Get the node type mappings for a grammar name.
pub fn get_node_types(language: &str) -> HashMap<&'static str, NodeKind> {
    match language {
        "python" => python_node_types(),
        "javascript" | "jsx" => javascript_node_types(),
        "typescript" | "tsx" => typescript_node_types(),
        "go" => go_node_types(),
        "rust" => rust_node_types(),
        "java" => java_node_types(),
        "c" => c_node_types(),
        "cpp" => cpp_node_types(),
        "ruby" => ruby_node_types(),
        _ => HashMap::new(),
    }
}

/// Python node type mappings.
fn python_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("function_definition", NodeKind::Function),
        ("class_definition", NodeKind::Class),
        ("import_statement", NodeKind::Import),
        ("import_from_statement", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// JavaScript node type mappings.
fn javascript_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("function_declaration", NodeKind::Function),
        ("generator_function_declaration", NodeKind::Function),
        ("method_definition", NodeKind::Function),
        ("variable_declarator", NodeKind::Binding),
        ("class_declaration", NodeKind::Class),
        ("import_statement", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// TypeScript node type mappings (extends JavaScript).
fn typescript_node_types() -> HashMap<&'static str, NodeKind> {
    let mut types = javascript_node_types();
    types.extend([
        ("interface_declaration", NodeKind::Class),
        ("abstract_class_declaration", NodeKind::Class),
        ("enum_declaration", NodeKind::Class),
    ]);
    types
}

/// Go node type mappings.
fn go_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("function_declaration", NodeKind::Function),
        ("method_declaration", NodeKind::Function),
        ("type_spec", NodeKind::Class),
        ("import_spec", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// Rust node type mappings.
fn rust_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("function_item", NodeKind::Function),
        ("impl_item", NodeKind::Class),
        ("struct_item", NodeKind::Class),
        ("enum_item", NodeKind::Class),
        ("trait_item", NodeKind::Class),
        ("use_declaration", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// Java node type mappings.
fn java_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("method_declaration", NodeKind::Function),
        ("constructor_declaration", NodeKind::Function),
        ("class_declaration", NodeKind::Class),
        ("interface_declaration", NodeKind::Class),
        ("enum_declaration", NodeKind::Class),
        ("record_declaration", NodeKind::Class),
        ("import_declaration", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// C node type mappings.
fn c_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("function_definition", NodeKind::Function),
        ("struct_specifier", NodeKind::Class),
        ("union_specifier", NodeKind::Class),
        ("preproc_include", NodeKind::Import),
    ]
    .into_iter()
    .collect()
}

/// C++ node type mappings (extends C).
fn cpp_node_types() -> HashMap<&'static str, NodeKind> {
    let mut types = c_node_types();
    types.extend([("class_specifier", NodeKind::Class)]);
    types
}

/// Ruby node type mappings.
fn ruby_node_types() -> HashMap<&'static str, NodeKind> {
    [
        ("method", NodeKind::Function),
        ("singleton_method", NodeKind::Function),
        ("class", NodeKind::Class),
        ("module", NodeKind::Class),
    ]
    .into_iter()
    .collect()
}
