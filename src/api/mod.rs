//! HTTP surface.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;

/// Build the service routes with tracing and CORS middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/languages", get(handlers::list_languages))
        .route("/distill", post(handlers::distill))
        .route("/distill/jobs", post(handlers::start_distill_job))
        .route("/distill/jobs/:job_id", get(handlers::get_job_status))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DistillJobStatus, ServiceConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(ServiceConfig::default())))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_languages() {
        let (status, body) = send(app(), get_request("/languages")).await;
        assert_eq!(status, StatusCode::OK);

        let languages = body.as_array().unwrap();
        assert_eq!(languages.len(), 13);
        let php = languages.iter().find(|l| l["name"] == "php").unwrap();
        assert_eq!(php["dependency_analysis"], true);
        assert_eq!(php["structure"], false);
    }

    #[tokio::test]
    async fn test_distill_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("app.py"), "import util\n\ndef main():\n    util_helper()\n").unwrap();
        std::fs::write(
            root.join("util.py"),
            "def util_helper():\n    return 1\n\ndef unused():\n    return 2\n",
        )
        .unwrap();

        let request = post_json("/distill", json!({ "path": root.join("app.py") }));
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fell_back"], false);
        let text = body["file"]["children"][0]["text"].as_str().unwrap();
        assert!(text.contains("def util_helper():"));
        assert!(!text.contains("def unused():"));
        assert_eq!(body["related_files"][0], root.join("util.py").display().to_string());
    }

    #[tokio::test]
    async fn test_distill_missing_file() {
        let request = post_json("/distill", json!({ "path": "/does/not/exist.py" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("exist.py"));
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.py"), "def main():\n    pass\n").unwrap();

        let app = app();
        let request = post_json("/distill/jobs", json!({ "paths": [root.join("a.py")] }));
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["files_count"], 1);

        let job_id = body["job_id"].as_str().unwrap().to_string();
        let uri = format!("/distill/jobs/{}", job_id);
        let mut last = Value::Null;
        for _ in 0..100 {
            let (status, body) = send(app.clone(), get_request(&uri)).await;
            assert_eq!(status, StatusCode::OK);
            last = body;
            if last["status"] == json!(DistillJobStatus::Completed) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(last["status"], "completed");
        assert_eq!(last["processed_files"], 1);
    }

    #[tokio::test]
    async fn test_empty_job_is_rejected() {
        let (status, body) = send(app(), post_json("/distill/jobs", json!({ "paths": [] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], false);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let uri = format!("/distill/jobs/{}", uuid::Uuid::new_v4());
        let (status, _) = send(app(), get_request(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
