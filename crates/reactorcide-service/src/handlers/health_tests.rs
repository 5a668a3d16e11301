use super::*;
use crate::test_support::test_state;
use axum::extract::State;

#[tokio::test]
async fn health_reports_ok() {
    let response = health(State(test_state())).await;
    assert_eq!(response.0.status, "ok");
}

#[tokio::test]
async fn metrics_renders_successfully() {
    assert!(metrics(State(test_state())).await.is_ok());
}
