//! Request/response definitions for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{DistillOutcome, DistillStats};
use crate::ir::DistilledFile;

/// Request to distill a single file synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillRequest {
    /// Path of the file to analyze
    pub path: String,

    /// Override of the configured traversal depth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Override of the dependency-aware flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Result of a synchronous distillation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillResponse {
    /// Distilled document, tagged with the original path and language
    pub file: DistilledFile,

    /// Entry points that seeded the traversal
    pub entry_points: Vec<String>,

    /// Symbols and type names marked reachable
    pub used_symbols: Vec<String>,

    /// Files discovered through imports
    pub related_files: Vec<String>,

    /// Whether the single-file fallback filter produced the output
    pub fell_back: bool,

    pub stats: DistillStats,
}

impl From<DistillOutcome> for DistillResponse {
    fn from(outcome: DistillOutcome) -> Self {
        Self {
            entry_points: outcome.entry_points,
            used_symbols: outcome.used.iter().cloned().collect(),
            related_files: outcome
                .related_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            fell_back: outcome.fell_back,
            stats: outcome.stats,
            file: outcome.file,
        }
    }
}

/// Request to start a batch distillation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDistillJobRequest {
    /// Files to analyze, each as its own run
    pub paths: Vec<String>,

    /// Override of the configured traversal depth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Response when starting a distillation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDistillJobResponse {
    /// ID of the created job
    pub job_id: Uuid,

    /// Whether the job was accepted
    pub accepted: bool,

    /// Number of files queued
    pub files_count: usize,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status of a distillation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistillJobStatus {
    /// Job is queued but not started
    Pending,
    /// Job is currently running
    Running,
    /// Job completed
    Completed,
    /// Job failed
    Failed,
}

/// Outcome for one file of a batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,

    pub success: bool,

    #[serde(default)]
    pub fell_back: bool,

    #[serde(default)]
    pub used_symbols: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<DistilledFile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response with job status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillJobStatusResponse {
    /// ID of the job
    pub job_id: Uuid,

    /// Current status
    pub status: DistillJobStatus,

    /// Total files to process
    pub total_files: usize,

    /// Files processed so far
    pub processed_files: usize,

    /// Per-file results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FileResult>,

    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
