//! HTTP request handlers for the distillation service.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tokio::sync::{RwLock, Semaphore};
use tracing::info;
use uuid::Uuid;

use crate::analysis::DependencyAnalyzer;
use crate::batch::BatchConfig;
use crate::error::DistillError;
use crate::jobs::{JobProcessor, JobStore};
use crate::processing::Language;
use crate::types::{
    DistillRequest, DistillResponse, ServiceConfig, StartDistillJobRequest,
    StartDistillJobResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub job_store: Arc<RwLock<JobStore>>,
    /// Bounds concurrently running jobs
    pub job_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            job_slots: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            job_store: Arc::new(RwLock::new(JobStore::new())),
            config,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Capabilities of one language.
#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    name: &'static str,
    structure: bool,
    dependency_analysis: bool,
}

/// List supported languages.
pub async fn list_languages() -> Json<Vec<LanguageInfo>> {
    Json(
        Language::ALL
            .iter()
            .map(|language| LanguageInfo {
                name: language.as_str(),
                structure: language.supports_structure(),
                dependency_analysis: language.supports_dependency_analysis(),
            })
            .collect(),
    )
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

fn error_status(error: &DistillError) -> StatusCode {
    match error {
        DistillError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND
        }
        DistillError::Io { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Distill one file synchronously.
pub async fn distill(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DistillRequest>,
) -> Result<Json<DistillResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut config = state.config.distill.clone();
    if let Some(depth) = request.max_depth {
        config.max_depth = depth;
    }
    if let Some(enabled) = request.enabled {
        config.enabled = enabled;
    }

    info!(path = %request.path, max_depth = config.max_depth, "Received distill request");

    let analyzer = DependencyAnalyzer::new(config);
    match analyzer.analyze_path(FsPath::new(&request.path)).await {
        Ok(outcome) => Ok(Json(DistillResponse::from(outcome))),
        Err(e) => Err((
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Start a background distillation job.
pub async fn start_distill_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartDistillJobRequest>,
) -> Json<StartDistillJobResponse> {
    let files_count = request.paths.len();

    if files_count == 0 {
        return Json(StartDistillJobResponse {
            job_id: Uuid::nil(),
            accepted: false,
            files_count: 0,
            message: Some("No paths provided".to_string()),
        });
    }

    info!(files = files_count, "Received distill job request");

    let job_id = state.job_store.write().await.create_job(files_count);

    let processor = JobProcessor::new(
        state.config.distill.clone(),
        BatchConfig {
            concurrency: state.config.distill.index_concurrency,
            ..Default::default()
        },
        state.job_slots.clone(),
    );
    let job_store = state.job_store.clone();
    tokio::spawn(async move {
        processor.process_job(job_id, request, job_store).await;
    });

    Json(StartDistillJobResponse {
        job_id,
        accepted: true,
        files_count,
        message: None,
    })
}

/// Get job status.
pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.job_store.read().await;

    match store.get_job_status(job_id) {
        Some(status) => Ok(Json(status)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
