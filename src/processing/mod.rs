//! Processing module for file loading and classification.
//!
//! This module provides:
//! - Language detection from file extensions and shebang lines
//! - Source loading with size limits, binary rejection and encoding validation

pub mod file_processor;
pub mod language;

pub use file_processor::FileLoader;
pub use language::{Language, LanguageDetector, LanguageInfo};
