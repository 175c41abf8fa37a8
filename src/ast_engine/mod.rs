//! Structural parsing.
//!
//! Tree-sitter grammars turn a file into the declaration tree ([`crate::ir`])
//! used for entry-point selection and the fallback filter.

pub mod languages;
pub mod parser;

pub use parser::{NodeKind, StructureParser};
