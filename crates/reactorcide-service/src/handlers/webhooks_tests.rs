use super::*;
use crate::test_support::test_state;
use crate::create_router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn unknown_provider_returns_404_through_the_router() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/bitbucket")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unregistered_project_returns_500_secret_not_configured() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/github")
                .header("content-type", "application/json")
                .header("X-GitHub-Event", "push")
                .body(Body::from(
                    serde_json::json!({
                        "ref": "refs/heads/main",
                        "after": "abc123",
                        "repository": {"full_name": "org/repo", "clone_url": "https://github.com/org/repo.git"},
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
