//! Batch processing utilities for distilling many files.
//!
//! Every path is an independent analysis run with its own indices and call
//! graph, so runs share nothing but the analyzer configuration.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analysis::{DependencyAnalyzer, DistillOutcome};
use crate::error::Result;
use crate::types::FileResult;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum files analyzed concurrently
    pub concurrency: usize,
    /// Whether to keep the distilled tree in each result
    pub include_files: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            include_files: true,
        }
    }
}

/// Result of batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total_items: usize,
    pub processed_items: usize,
    pub failed_items: usize,
    /// Runs that ended in the single-file filter
    pub fallbacks: usize,
    pub errors: Vec<BatchError>,
}

impl BatchResult {
    fn record(&mut self, result: &FileResult) {
        if result.success {
            self.processed_items += 1;
            if result.fell_back {
                self.fallbacks += 1;
            }
        } else {
            self.failed_items += 1;
            self.errors.push(BatchError {
                path: result.path.clone(),
                error: result.error.clone().unwrap_or_default(),
            });
        }
    }
}

/// Error during batch processing.
#[derive(Debug, Clone)]
pub struct BatchError {
    pub path: String,
    pub error: String,
}

/// Batch processor for distilling many files.
pub struct BatchProcessor {
    analyzer: Arc<DependencyAnalyzer>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor.
    pub fn new(analyzer: Arc<DependencyAnalyzer>, config: BatchConfig) -> Self {
        Self { analyzer, config }
    }

    /// Analyze every path and return per-file results in input order.
    ///
    /// A failing file is recorded and never stops the batch.
    pub async fn process_batch(&self, paths: Vec<PathBuf>) -> (Vec<FileResult>, BatchResult) {
        let mut summary = BatchResult {
            total_items: paths.len(),
            ..Default::default()
        };
        info!(total_items = summary.total_items, "Starting batch distillation");

        let results: Vec<FileResult> = stream::iter(paths)
            .map(|path| self.process_single_item(path))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for result in &results {
            summary.record(result);
        }

        info!(
            processed = summary.processed_items,
            failed = summary.failed_items,
            fallbacks = summary.fallbacks,
            "Batch distillation complete"
        );
        (results, summary)
    }

    /// Analyze every path, sending each result as soon as it is ready.
    pub async fn process_batch_streaming(
        &self,
        paths: Vec<PathBuf>,
        sender: mpsc::Sender<FileResult>,
    ) -> BatchResult {
        let mut summary = BatchResult {
            total_items: paths.len(),
            ..Default::default()
        };

        let mut results = stream::iter(paths)
            .map(|path| self.process_single_item(path))
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some(result) = results.next().await {
            summary.record(&result);
            if sender.send(result).await.is_err() {
                warn!("Receiver dropped, stopping batch distillation");
                break;
            }
        }

        summary
    }

    /// Distill a single file.
    async fn process_single_item(&self, path: PathBuf) -> FileResult {
        let path_text = path.display().to_string();
        match self.analyze(path).await {
            Ok(outcome) => FileResult {
                path: path_text,
                success: true,
                fell_back: outcome.fell_back,
                used_symbols: outcome.used.len(),
                file: self.config.include_files.then_some(outcome.file),
                error: None,
            },
            Err(e) => {
                warn!(file = %path_text, error = %e, "Failed to distill file");
                FileResult {
                    path: path_text,
                    success: false,
                    fell_back: false,
                    used_symbols: 0,
                    file: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn analyze(&self, path: PathBuf) -> Result<DistillOutcome> {
        self.analyzer.analyze_path(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> BatchProcessor {
        BatchProcessor::new(Arc::new(DependencyAnalyzer::default()), BatchConfig::default())
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.py"), "def main():\n    pass\n").unwrap();
        std::fs::write(root.join("b.go"), "package main\n\nfunc main() {}\n").unwrap();

        let paths = vec![root.join("a.py"), root.join("missing.py"), root.join("b.go")];
        let (results, summary) = processor().process_batch(paths).await;

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.processed_items, 2);
        assert_eq!(summary.failed_items, 1);
        assert_eq!(summary.errors[0].path, root.join("missing.py").display().to_string());

        let successes: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(successes, vec![true, false, true]);
        assert!(results[0].file.is_some());
    }

    #[tokio::test]
    async fn test_streaming_sends_every_result() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.py"), "def main():\n    pass\n").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let summary = processor()
            .process_batch_streaming(vec![root.join("a.py"), root.join("gone.py")], tx)
            .await;

        let mut received = Vec::new();
        while let Some(result) = rx.recv().await {
            received.push(result);
        }
        assert_eq!(received.len(), 2);
        assert_eq!(summary.processed_items, 1);
        assert_eq!(summary.failed_items, 1);
    }
}
