//! Job store for tracking distillation job status.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{DistillJobStatus, DistillJobStatusResponse, FileResult};

/// In-memory job store for tracking distillation jobs.
pub struct JobStore {
    jobs: HashMap<Uuid, JobRecord>,
}

/// Internal record for tracking a job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: DistillJobStatus,
    pub total_files: usize,
    pub processed_files: usize,
    pub results: Vec<FileResult>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new job record.
    pub fn new(job_id: Uuid, total_files: usize) -> Self {
        Self {
            job_id,
            status: DistillJobStatus::Pending,
            total_files,
            processed_files: 0,
            results: Vec::new(),
            error: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the job as started.
    pub fn start(&mut self) {
        self.status = DistillJobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Record the outcome of one file.
    pub fn record(&mut self, result: FileResult) {
        self.results.push(result);
        self.processed_files = self.results.len();
    }

    /// Mark the job as completed.
    pub fn complete(&mut self) {
        self.status = DistillJobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the job as failed.
    pub fn fail(&mut self, error: String) {
        self.status = DistillJobStatus::Failed;
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    fn is_finished(&self) -> bool {
        matches!(self.status, DistillJobStatus::Completed | DistillJobStatus::Failed)
    }

    /// Convert to response type.
    pub fn to_response(&self) -> DistillJobStatusResponse {
        DistillJobStatusResponse {
            job_id: self.job_id,
            status: self.status,
            total_files: self.total_files,
            processed_files: self.processed_files,
            results: self.results.clone(),
            error: self.error.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

impl JobStore {
    /// Create a new job store.
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Create a new job and return its ID.
    pub fn create_job(&mut self, total_files: usize) -> Uuid {
        let job_id = Uuid::new_v4();
        self.jobs.insert(job_id, JobRecord::new(job_id, total_files));
        job_id
    }

    /// Get a job by ID.
    pub fn get_job(&self, job_id: Uuid) -> Option<&JobRecord> {
        self.jobs.get(&job_id)
    }

    /// Get a mutable reference to a job.
    pub fn get_job_mut(&mut self, job_id: Uuid) -> Option<&mut JobRecord> {
        self.jobs.get_mut(&job_id)
    }

    /// Start a job.
    pub fn start_job(&mut self, job_id: Uuid) -> bool {
        self.update(job_id, JobRecord::start)
    }

    /// Record one file result.
    pub fn record_result(&mut self, job_id: Uuid, result: FileResult) -> bool {
        self.update(job_id, |job| job.record(result))
    }

    /// Complete a job.
    pub fn complete_job(&mut self, job_id: Uuid) -> bool {
        self.update(job_id, JobRecord::complete)
    }

    /// Fail a job.
    pub fn fail_job(&mut self, job_id: Uuid, error: String) -> bool {
        self.update(job_id, |job| job.fail(error))
    }

    fn update(&mut self, job_id: Uuid, apply: impl FnOnce(&mut JobRecord)) -> bool {
        match self.jobs.get_mut(&job_id) {
            Some(job) => {
                apply(job);
                true
            }
            None => false,
        }
    }

    /// Get job status as response.
    pub fn get_job_status(&self, job_id: Uuid) -> Option<DistillJobStatusResponse> {
        self.jobs.get(&job_id).map(|j| j.to_response())
    }

    /// Clean up finished jobs older than 1 hour.
    pub fn cleanup_old_jobs(&mut self) -> usize {
        self.cleanup_finished_before(Utc::now() - chrono::Duration::hours(1))
    }

    /// Drop finished jobs completed before `cutoff`. Returns how many were removed.
    pub fn cleanup_finished_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            !job.is_finished() || job.completed_at.map_or(true, |t| t > cutoff)
        });
        before - self.jobs.len()
    }

    /// Get count of jobs by status.
    pub fn get_job_counts(&self) -> HashMap<DistillJobStatus, usize> {
        let mut counts = HashMap::new();
        for job in self.jobs.values() {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
