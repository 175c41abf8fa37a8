//! Job processor for background distillation.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use super::store::JobStore;
use crate::analysis::DependencyAnalyzer;
use crate::batch::{BatchConfig, BatchProcessor};
use crate::types::{DistillConfig, StartDistillJobRequest};

/// Processor that runs distillation jobs in the background.
pub struct JobProcessor {
    config: DistillConfig,
    batch: BatchConfig,
    slots: Arc<Semaphore>,
}

impl JobProcessor {
    /// Create a new job processor. `slots` bounds how many jobs run at once.
    pub fn new(config: DistillConfig, batch: BatchConfig, slots: Arc<Semaphore>) -> Self {
        Self {
            config,
            batch,
            slots,
        }
    }

    /// Process a distillation job, recording each file as it finishes.
    pub async fn process_job(
        &self,
        job_id: Uuid,
        request: StartDistillJobRequest,
        job_store: Arc<RwLock<JobStore>>,
    ) {
        let _permit = match self.slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Job slots closed");
                job_store.write().await.fail_job(job_id, e.to_string());
                return;
            }
        };

        info!(job_id = %job_id, files = request.paths.len(), "Starting job processing");
        job_store.write().await.start_job(job_id);

        let mut config = self.config.clone();
        if let Some(depth) = request.max_depth {
            config.max_depth = depth;
        }
        let processor = BatchProcessor::new(Arc::new(DependencyAnalyzer::new(config)), self.batch.clone());
        let paths: Vec<PathBuf> = request.paths.iter().map(PathBuf::from).collect();

        let (tx, mut rx) = mpsc::channel(self.batch.concurrency.max(1));
        let recorder = {
            let job_store = job_store.clone();
            tokio::spawn(async move {
                while let Some(result) = rx.recv().await {
                    job_store.write().await.record_result(job_id, result);
                }
            })
        };

        let summary = processor.process_batch_streaming(paths, tx).await;
        if let Err(e) = recorder.await {
            warn!(job_id = %job_id, error = %e, "Result recorder failed");
        }

        info!(
            job_id = %job_id,
            processed = summary.processed_items,
            failed = summary.failed_items,
            fallbacks = summary.fallbacks,
            "Job processing complete"
        );

        let mut store = job_store.write().await;
        if summary.total_items > 0 && summary.processed_items == 0 {
            store.fail_job(job_id, format!("all {} files failed", summary.failed_items));
        } else {
            store.complete_job(job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DistillJobStatus;

    fn processor() -> JobProcessor {
        JobProcessor::new(
            DistillConfig::default(),
            BatchConfig::default(),
            Arc::new(Semaphore::new(1)),
        )
    }

    #[tokio::test]
    async fn test_job_records_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.py"), "def main():\n    pass\n").unwrap();

        let store = Arc::new(RwLock::new(JobStore::new()));
        let job_id = store.write().await.create_job(2);
        let request = StartDistillJobRequest {
            paths: vec![
                root.join("a.py").display().to_string(),
                root.join("missing.py").display().to_string(),
            ],
            max_depth: Some(1),
        };

        processor().process_job(job_id, request, store.clone()).await;

        let status = store.read().await.get_job_status(job_id).unwrap();
        assert_eq!(status.status, DistillJobStatus::Completed);
        assert_eq!(status.processed_files, 2);
        assert_eq!(status.results.iter().filter(|r| r.success).count(), 1);
    }

    #[tokio::test]
    async fn test_job_fails_when_every_file_fails() {
        let store = Arc::new(RwLock::new(JobStore::new()));
        let job_id = store.write().await.create_job(1);
        let request = StartDistillJobRequest {
            paths: vec!["/does/not/exist.py".to_string()],
            max_depth: None,
        };

        processor().process_job(job_id, request, store.clone()).await;

        let status = store.read().await.get_job_status(job_id).unwrap();
        assert_eq!(status.status, DistillJobStatus::Failed);
        assert!(status.error.is_some());
    }
}
