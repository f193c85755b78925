pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::artifacts::handlers as artifacts;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Delivery
        .route("/resume/:job_id", get(artifacts::handle_get_resume))
        // Jobs
        .route("/jobs", get(jobs::handle_list_jobs))
        .route("/jobs/versions", get(jobs::handle_list_versions))
        .route("/jobs/:id", get(jobs::handle_get_job))
        .route("/jobs/:id/status", put(jobs::handle_update_status))
        .route("/stats", get(jobs::handle_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::artifacts::local::LocalFileReader;
    use crate::artifacts::locator::LocatorConfig;
    use crate::artifacts::testing::{FakeRenderer, MemoryObjectStore, RenderBehavior};
    use crate::artifacts::{ArtifactLocator, ArtifactResolver};
    use crate::jobs::status::JobStatus;
    use crate::jobs::store::memory::{job, MemoryJobStore};

    struct Harness {
        app: Router,
        jobs: Arc<MemoryJobStore>,
        renderer: Arc<FakeRenderer>,
        _dir: tempfile::TempDir,
    }

    fn harness(behavior: RenderBehavior) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "output/Acme/v2/resume.tex", b"\\documentclass{article}");

        let jobs = Arc::new(MemoryJobStore::new());
        let mut s3_job = job(42, "Acme", "SWE Intern", 1);
        s3_job.status = JobStatus::ResumeGenerated;
        s3_job.score = Some(88.0);
        s3_job.artifact_path = Some("s3://bucket/resumes/Acme/v1/Resume_Acme.tex".to_string());
        jobs.insert(s3_job);

        let mut local_job = job(7, "Acme", "SWE Intern", 2);
        local_job.status = JobStatus::ResumeGenerated;
        local_job.score = Some(93.0);
        local_job.artifact_path = Some("/files/output/Acme/v2/resume.tex".to_string());
        jobs.insert(local_job);

        let mut scored = job(8, "Globex", "Backend Engineer", 1);
        scored.score = Some(41.0);
        jobs.insert(scored);

        let store = Arc::new(MemoryObjectStore::with(&[(
            "resumes/Acme/v1/Resume_Acme.tex",
            b"\\begin{document}",
        )]));
        let renderer = FakeRenderer::new(dir.path(), behavior);
        let resolver = ArtifactResolver::new(
            ArtifactLocator::new(LocatorConfig::default()),
            store,
            LocalFileReader::new(dir.path()),
            renderer.clone(),
        );

        let app = build_router(AppState {
            jobs: jobs.clone(),
            resolver: Arc::new(resolver),
        });

        Harness {
            app,
            jobs,
            renderer,
            _dir: dir,
        }
    }

    fn write(root: &Path, rel: &str, body: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    async fn get(app: &Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn put_status(app: &Router, id: i64, status: &str) -> axum::response::Response {
        put_status_body(app, &id.to_string(), json!({ "status": status }).to_string()).await
    }

    async fn put_status_body(app: &Router, id: &str, body: String) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/jobs/{id}/status"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(RenderBehavior::Compile);
        let response = get(&h.app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_download_source_from_object_store() {
        let h = harness(RenderBehavior::Compile);
        let response = get(&h.app, "/resume/42?format=source").await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Resume_Acme.tex\""
        );
        assert_eq!(headers[header::CONTENT_LENGTH], "16");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\\begin{document}");
    }

    #[tokio::test]
    async fn test_object_store_missing_pdf_is_404_without_compile() {
        let h = harness(RenderBehavior::Compile);
        let response = get(&h.app, "/resume/42?format=pdf").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
        assert!(h.renderer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_local_pdf_is_compiled_on_first_request_only() {
        let h = harness(RenderBehavior::Compile);

        let response = get(&h.app, "/resume/7").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(h.renderer.calls(), vec!["output/Acme/v2/resume.tex".to_string()]);

        let again = get(&h.app, "/resume/7?format=rendered").await;
        assert_eq!(again.status(), StatusCode::OK);
        assert_eq!(h.renderer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_renderer_is_503() {
        let h = harness(RenderBehavior::Unreachable);
        let response = get(&h.app, "/resume/7?format=pdf").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_failed_compile_is_500() {
        let h = harness(RenderBehavior::SucceedWithoutOutput);
        let response = get(&h.app, "/resume/7?format=pdf").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"]["code"],
            "RENDER_COMPILATION_FAILED"
        );
    }

    #[tokio::test]
    async fn test_unknown_job_and_missing_artifact_are_404() {
        let h = harness(RenderBehavior::Compile);
        assert_eq!(get(&h.app, "/resume/999").await.status(), StatusCode::NOT_FOUND);
        // Job 8 is only scored; no artifact path yet.
        assert_eq!(get(&h.app, "/resume/8").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_format_is_400() {
        let h = harness(RenderBehavior::Compile);
        let response = get(&h.app, "/resume/7?format=docx").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.renderer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let h = harness(RenderBehavior::Compile);
        let response = put_status(&h.app, 7, "applied").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], 7);
        assert_eq!(body["status"], "applied");
        assert!(body["updated_at"].is_string());
        assert_eq!(h.jobs.status_of(7), Some(JobStatus::Applied));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let h = harness(RenderBehavior::Compile);
        let response = put_status(&h.app, 7, "not_a_real_status").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_STATUS");
        assert_eq!(h.jobs.status_of(7), Some(JobStatus::ResumeGenerated));
    }

    #[tokio::test]
    async fn test_update_status_rejects_non_string_status() {
        let h = harness(RenderBehavior::Compile);

        for body in [r#"{"status": 5}"#, r#"{"status": null}"#, "{}"] {
            let response = put_status_body(&h.app, "7", body.to_string()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(json_body(response).await["error"]["code"], "INVALID_STATUS");
        }
        assert_eq!(h.jobs.status_of(7), Some(JobStatus::ResumeGenerated));
    }

    #[tokio::test]
    async fn test_update_status_malformed_json_is_400() {
        let h = harness(RenderBehavior::Compile);
        let response = put_status_body(&h.app, "7", "not json".to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_numeric_ids_use_error_body() {
        let h = harness(RenderBehavior::Compile);

        for uri in ["/resume/abc", "/jobs/abc"] {
            let response = get(&h.app, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
            assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        }

        let response = put_status_body(&h.app, "abc", json!({ "status": "applied" }).to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_query_parameters_use_error_body() {
        let h = harness(RenderBehavior::Compile);

        for uri in ["/jobs?limit=many", "/jobs/versions?owner=owner@example.com"] {
            let response = get(&h.app, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
            assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_update_status_unknown_job() {
        let h = harness(RenderBehavior::Compile);
        let response = put_status(&h.app, 999, "applied").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_job_detail_includes_versions() {
        let h = harness(RenderBehavior::Compile);
        let response = get(&h.app, "/jobs/42").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["job"]["id"], 42);
        assert_eq!(body["has_resume"], true);
        let versions: Vec<i64> = body["versions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["version"].as_i64().unwrap())
            .collect();
        assert_eq!(versions, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_versions_endpoint() {
        let h = harness(RenderBehavior::Compile);
        let response = get(
            &h.app,
            "/jobs/versions?owner=owner@example.com&company=Acme&role=SWE%20Intern",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["latest"], 7);
        assert_eq!(body["versions"].as_array().unwrap().len(), 2);

        let empty = json_body(
            get(&h.app, "/jobs/versions?owner=owner@example.com&company=Nope&role=Nope").await,
        )
        .await;
        assert_eq!(empty["latest"], Value::Null);
        assert_eq!(empty["versions"], json!([]));
    }

    #[tokio::test]
    async fn test_list_jobs_filters() {
        let h = harness(RenderBehavior::Compile);

        let all = json_body(get(&h.app, "/jobs").await).await;
        let ids: Vec<i64> = all
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![8, 7, 42]);

        let generated = json_body(get(&h.app, "/jobs?status=resume_generated&min_score=90").await).await;
        assert_eq!(generated.as_array().unwrap().len(), 1);
        assert_eq!(generated[0]["id"], 7);

        let paged = json_body(get(&h.app, "/jobs?limit=1&offset=1").await).await;
        assert_eq!(paged[0]["id"], 7);

        let bad = get(&h.app, "/jobs?status=bogus").await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats() {
        let h = harness(RenderBehavior::Compile);
        let body = json_body(get(&h.app, "/stats").await).await;

        assert_eq!(body["totals"]["total_jobs"], 3);
        assert_eq!(body["totals"]["resumes_generated"], 2);
        assert_eq!(body["totals"]["scored"], 1);
        assert_eq!(body["totals"]["max_score"], 93.0);
        assert_eq!(
            body["score_distribution"],
            json!([
                { "range": "90-100", "count": 1 },
                { "range": "80-89", "count": 1 },
                { "range": "Below 50", "count": 1 }
            ])
        );
        assert_eq!(body["recent_jobs"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stats_scoped_to_owner() {
        let h = harness(RenderBehavior::Compile);
        let mut other = job(9, "Initech", "Analyst", 1);
        other.owner = "someone@example.com".to_string();
        other.score = Some(75.0);
        h.jobs.insert(other);

        let body = json_body(get(&h.app, "/stats?owner=someone@example.com").await).await;
        assert_eq!(body["totals"]["total_jobs"], 1);
        assert_eq!(body["totals"]["avg_score"], 75.0);
        assert_eq!(body["score_distribution"], json!([{ "range": "70-79", "count": 1 }]));
        assert_eq!(body["recent_jobs"][0]["id"], 9);
    }
}
