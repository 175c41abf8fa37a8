//! Source loading for the distillation pipeline.
//!
//! Combines size limits, binary detection, encoding validation and
//! language detection to turn a path on disk into a [`SourceFile`].

use std::path::Path;
use std::str;

use tracing::debug;

use crate::error::{DistillError, Result};
use crate::processing::language;
use crate::types::SourceFile;

/// Number of leading bytes inspected for binary content.
const BINARY_SAMPLE_SIZE: usize = 8192;

/// Loads source files from disk.
#[derive(Debug, Clone)]
pub struct FileLoader {
    max_file_size: usize,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileLoader {
    /// Create a loader rejecting files larger than `max_file_size` bytes.
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Read, validate and classify a file.
    pub async fn load(&self, path: &Path) -> Result<SourceFile> {
        let path = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| DistillError::io(path, e))?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DistillError::io(&path, e))?;
        if !metadata.is_file() {
            return Err(DistillError::FileRejected {
                path,
                reason: "not a regular file".to_string(),
            });
        }
        if metadata.len() > self.max_file_size as u64 {
            return Err(DistillError::FileRejected {
                path,
                reason: format!(
                    "File too large: {} bytes (max: {} bytes)",
                    metadata.len(),
                    self.max_file_size
                ),
            });
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| DistillError::io(&path, e))?;

        self.decode(path, &bytes)
    }

    /// Validate already-read bytes and build the source file.
    pub fn decode(&self, path: impl Into<std::path::PathBuf>, bytes: &[u8]) -> Result<SourceFile> {
        let path = path.into();

        if !has_utf16_bom(bytes) && is_binary_content(bytes, BINARY_SAMPLE_SIZE) {
            return Err(DistillError::FileRejected {
                path,
                reason: "Binary file detected".to_string(),
            });
        }

        let (content, encoding) = validate_encoding(bytes);
        let language = language::detect(&path, Some(&content)).language;

        debug!(
            file = %path.display(),
            language = %language,
            encoding,
            bytes = bytes.len(),
            "Loaded source file"
        );

        Ok(SourceFile::new(path, language, content))
    }
}

/// Check for a NUL byte in the leading sample.
pub fn is_binary_content(content: &[u8], sample_size: usize) -> bool {
    content[..content.len().min(sample_size)].contains(&0)
}

fn has_utf16_bom(content: &[u8]) -> bool {
    content.len() >= 2 && matches!((content[0], content[1]), (0xFF, 0xFE) | (0xFE, 0xFF))
}

/// Decode content, returning the text and the encoding used.
pub fn validate_encoding(content: &[u8]) -> (String, &'static str) {
    if let Ok(s) = str::from_utf8(content) {
        return (s.to_string(), "utf-8");
    }

    if content.len() >= 2 && content[0] == 0xFF && content[1] == 0xFE {
        let utf16: Vec<u16> = content[2..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&utf16) {
            return (s, "utf-16-le");
        }
    }

    if content.len() >= 2 && content[0] == 0xFE && content[1] == 0xFF {
        let utf16: Vec<u16> = content[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&utf16) {
            return (s, "utf-16-be");
        }
    }

    // Latin-1 always succeeds
    (content.iter().map(|&b| b as char).collect(), "latin-1")
}
