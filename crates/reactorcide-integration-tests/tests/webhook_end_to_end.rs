//! End-to-end coverage of the webhook ingestion pipeline (scenarios 1-3 of
//! the testable-properties table): a signed push against a project with a
//! dedicated CI repo creates and dispatches a job; an unsigned/mis-signed
//! request is rejected before anything is persisted; a tag push outside the
//! project's branch filter is accepted but produces no job.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{github_signature, router, test_app_state};
use reactorcide_core::project::test_support::empty_project;
use serde_json::Value;
use tower::ServiceExt;

async fn project_with_dedicated_ci_repo(state: &reactorcide_service::AppState, webhook_secret: &str) {
    let mut project = empty_project();
    project.repo_url = "https://github.com/org/repo.git".to_string();
    project.webhook_secret = "ci/webhook:github".to_string();
    project.default_ci_source_url = "https://github.com/trusted/ci-repo.git".to_string();
    project.default_ci_source_ref = "main".to_string();
    project.target_branches = vec!["main".to_string()];

    state.secrets.initialize_org(&project.project_id.to_string()).await.unwrap();
    state.secrets.set(&project.project_id.to_string(), "ci/webhook", "github", webhook_secret).await.unwrap();
    state.projects.create(project).await.unwrap();
}

fn push_body(git_ref: &str, sha: &str) -> Vec<u8> {
    serde_json::json!({
        "ref": git_ref,
        "after": sha,
        "repository": {
            "full_name": "org/repo",
            "clone_url": "https://github.com/org/repo.git",
        },
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn signed_push_to_main_creates_a_job_through_the_full_router() {
    let state = test_app_state();
    project_with_dedicated_ci_repo(&state, "wh-secret").await;
    let app = router(state);

    let body = push_body("refs/heads/main", "abc123def4567890");
    let signature = github_signature("wh-secret", &body);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/github")
                .header("x-github-event", "push")
                .header("x-hub-signature-256", signature)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn bad_signature_is_rejected_before_any_job_is_created() {
    let state = test_app_state();
    project_with_dedicated_ci_repo(&state, "wh-secret").await;
    let app = router(state.clone());

    let body = push_body("refs/heads/main", "abc123def4567890");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/github")
                .header("x-github-event", "push")
                .header("x-hub-signature-256", "sha256=0000000000000000000000000000000000000000000000000000000000000000")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.jobs.list(Default::default(), 100, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn push_to_a_branch_outside_the_filter_is_accepted_but_creates_no_job() {
    let state = test_app_state();
    project_with_dedicated_ci_repo(&state, "wh-secret").await;
    let app = router(state.clone());

    let body = push_body("refs/heads/feature-x", "def456abc7890123");
    let signature = github_signature("wh-secret", &body);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/github")
                .header("x-github-event", "push")
                .header("x-hub-signature-256", signature)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.jobs.list(Default::default(), 100, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn an_unregistered_repository_yields_500_without_leaking_which_check_failed() {
    let state = test_app_state();
    let app = router(state);

    let body = push_body("refs/heads/main", "abc123def4567890");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/github")
                .header("x-github-event", "push")
                .header("x-hub-signature-256", "sha256=deadbeef")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
