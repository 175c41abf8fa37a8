//! Turning analysis results back into a single declaration tree.

use std::path::Path;

use super::reachability::UsedSet;
use crate::ir::{DistilledFile, Node};
use crate::types::{fqn, Project};

/// `format` of the node carrying reconstructed source.
pub const IMPLEMENTATION_FORMAT: &str = "implementation";

/// Collapse a project into one comment node of the analyzed file.
///
/// Each non-empty file contributes a `// === path ===` header followed by its
/// content. The analyzed file comes first, the rest in path order. The
/// document keeps the original path and language.
pub fn collapse(project: &Project, main: &Path, original: &DistilledFile) -> DistilledFile {
    let ordered = project
        .files
        .get(main)
        .into_iter()
        .chain(project.files.values().filter(|f| f.path != main));

    let mut text = String::new();
    for file in ordered.filter(|f| !f.content.is_empty()) {
        text.push_str(&format!("// === {} ===\n{}\n\n", file.path.display(), file.content));
    }

    let children = if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::Comment {
            text,
            format: IMPLEMENTATION_FORMAT.to_string(),
            line: 1,
        }]
    };
    DistilledFile::new(original.path.clone(), original.language).with_children(children)
}

fn function_used(main: &Path, name: &str, used: &UsedSet) -> bool {
    used.contains(name) || used.contains(&fqn(main, name))
}

fn method_used(main: &Path, class: &str, method: &str, used: &UsedSet) -> bool {
    let dotted = format!("{}.{}", class, method);
    let qualified = format!("{}::{}", class, method);
    function_used(main, &dotted, used)
        || function_used(main, method, used)
        || used.contains(&fqn(main, &qualified))
}

/// Single-file filter used when assembly fails.
///
/// Top-level functions are kept when used; classes are kept with their used
/// methods only, and dropped when none remain. Other nodes are kept.
pub fn filter_tree(tree: &DistilledFile, main: &Path, used: &UsedSet) -> DistilledFile {
    let mut children = Vec::with_capacity(tree.children.len());

    for node in &tree.children {
        match node {
            Node::Function { name, .. } => {
                if function_used(main, name, used) {
                    children.push(node.clone());
                }
            }
            Node::Class {
                name,
                visibility,
                children: members,
                line_start,
                line_end,
            } => {
                let kept: Vec<Node> = members
                    .iter()
                    .filter(|m| match m {
                        Node::Function { name: method, .. } => method_used(main, name, method, used),
                        _ => true,
                    })
                    .cloned()
                    .collect();
                let has_method = kept.iter().any(|m| matches!(m, Node::Function { .. }));
                if has_method {
                    children.push(Node::Class {
                        name: name.clone(),
                        visibility: *visibility,
                        children: kept,
                        line_start: *line_start,
                        line_end: *line_end,
                    });
                }
            }
            other => children.push(other.clone()),
        }
    }

    DistilledFile::new(tree.path.clone(), tree.language).with_children(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Visibility;
    use crate::processing::Language;
    use crate::types::AssembledFile;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn assembled(path: &str, content: &str) -> AssembledFile {
        AssembledFile {
            path: PathBuf::from(path),
            language: Language::Python,
            snippets: Vec::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_collapse_puts_main_first() {
        let mut project = Project::default();
        for file in [
            assembled("/p/a.py", "def helper():\n    pass"),
            assembled("/p/main.py", "def main():\n    helper()"),
            assembled("/p/z.py", ""),
        ] {
            project.files.insert(file.path.clone(), file);
        }
        let original = DistilledFile::new("/p/main.py", Language::Python)
            .with_children(vec![Node::function("main", Visibility::Public)]);

        let collapsed = collapse(&project, Path::new("/p/main.py"), &original);
        assert_eq!(collapsed.path, "/p/main.py");
        assert_eq!(collapsed.language, Language::Python);
        assert_eq!(
            collapsed.children,
            vec![Node::Comment {
                text: "// === /p/main.py ===\ndef main():\n    helper()\n\n// === /p/a.py ===\ndef helper():\n    pass\n\n"
                    .to_string(),
                format: "implementation".to_string(),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_collapse_of_empty_project_has_no_children() {
        let original = DistilledFile::new("/p/main.py", Language::Python);
        let collapsed = collapse(&Project::default(), Path::new("/p/main.py"), &original);
        assert!(collapsed.children.is_empty());
    }

    #[test]
    fn test_filter_tree() {
        let main = Path::new("/p/app.py");
        let tree = DistilledFile::new("/p/app.py", Language::Python).with_children(vec![
            Node::Import { module: "os".to_string(), line: 1 },
            Node::function("main", Visibility::Public),
            Node::function("dead", Visibility::Public),
            Node::class(
                "Service",
                Visibility::Public,
                vec![
                    Node::function("run", Visibility::Public),
                    Node::function("unused", Visibility::Public),
                ],
            ),
            Node::class("Empty", Visibility::Public, vec![Node::function("gone", Visibility::Public)]),
        ]);

        let mut used = UsedSet::default();
        used.insert("/p/app.py::main");
        used.insert("/p/app.py::Service::run");

        let filtered = filter_tree(&tree, main, &used);
        assert_eq!(
            filtered.children,
            vec![
                Node::Import { module: "os".to_string(), line: 1 },
                Node::function("main", Visibility::Public),
                Node::class("Service", Visibility::Public, vec![Node::function("run", Visibility::Public)]),
            ]
        );
    }
}
