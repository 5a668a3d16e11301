//! Liveness and metrics-scrape endpoints. Neither is authenticated (§6).

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use prometheus::TextEncoder;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(_state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse { status: "ok" })
}

/// Render the process-wide Prometheus registry as text exposition format.
pub async fn metrics(State(_state): State<AppState>) -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
