//! Reconstruction of the used code into per-file snippets.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::discovery::IndexedFile;
use super::index::SymbolIndex;
use super::reachability::UsedSet;
use crate::adapters::adapter_for;
use crate::error::{DistillError, Result};
use crate::types::{AssembledFile, CodeSnippet, Project, SourceFile, SymbolDefinition, SymbolKind};

/// Whether a definition is retained: functions by FQN, classes by FQN or by
/// their bare name appearing as a referenced type.
pub(crate) fn is_retained(def: &SymbolDefinition, used: &UsedSet) -> bool {
    match def.kind {
        SymbolKind::Function => used.contains(&def.fqn),
        SymbolKind::Class => used.contains(&def.fqn) || used.contains(def.short_name()),
    }
}

/// Copy the bytes of one snippet out of its file.
fn slice<'a>(source: &'a SourceFile, snippet: &CodeSnippet) -> Result<&'a str> {
    source
        .content
        .get(snippet.start_byte..snippet.end_byte)
        .ok_or_else(|| {
            DistillError::Assembly(format!(
                "{}: invalid range {}..{} for {} bytes",
                snippet.fqn,
                snippet.start_byte,
                snippet.end_byte,
                source.content.len()
            ))
        })
}

/// Assemble the retained definitions of one file.
///
/// Snippets are ordered by start offset, outer before inner. A snippet that
/// starts inside the previously emitted one is skipped, as is an empty one.
fn assemble_file(source: &SourceFile, mut retained: Vec<&SymbolDefinition>) -> Result<AssembledFile> {
    retained.sort_by_key(|d| (d.start_byte, Reverse(d.end_byte)));

    let mut snippets: Vec<CodeSnippet> = Vec::new();
    let mut bodies: Vec<&str> = Vec::new();
    let mut emitted_end = 0usize;

    for def in retained {
        let snippet = CodeSnippet::from(def);
        let body = slice(source, &snippet)?;
        if body.trim().is_empty() {
            continue;
        }
        if !snippets.is_empty() && snippet.start_byte < emitted_end {
            debug!(fqn = %snippet.fqn, "Skipping nested snippet");
            continue;
        }
        emitted_end = snippet.end_byte;
        bodies.push(body.trim_end());
        snippets.push(snippet);
    }

    let preamble = adapter_for(source.language)
        .map(|a| a.preamble())
        .unwrap_or_default();
    let content = if bodies.is_empty() {
        String::new()
    } else {
        format!("{}{}", preamble, bodies.join("\n\n"))
    };

    Ok(AssembledFile {
        path: source.path.clone(),
        language: source.language,
        snippets,
        content,
    })
}

/// Build the project of every retained definition across the related set.
///
/// Files without retained definitions get empty content. An invalid byte
/// range aborts assembly.
pub fn assemble(
    files: &BTreeMap<PathBuf, IndexedFile>,
    index: &SymbolIndex,
    used: &UsedSet,
    entry_points: &[String],
) -> Result<Project> {
    let mut grouped: BTreeMap<&std::path::Path, Vec<&SymbolDefinition>> = BTreeMap::new();
    for def in index.iter().filter(|d| is_retained(d, used)) {
        grouped.entry(def.file_path.as_path()).or_default().push(def);
    }

    let mut project = Project {
        entry_points: entry_points.to_vec(),
        ..Default::default()
    };
    for (path, file) in files {
        let retained = grouped.remove(path.as_path()).unwrap_or_default();
        let assembled = assemble_file(&file.source, retained)?;
        debug!(
            file = %path.display(),
            snippets = assembled.snippets.len(),
            "Assembled file"
        );
        project.files.insert(path.clone(), assembled);
    }

    Ok(project)
}
