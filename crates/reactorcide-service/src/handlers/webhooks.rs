//! `POST /webhooks/{provider}` — the one entry point into
//! [`crate::webhook_pipeline`].

use crate::responses::StatusResponse;
use crate::webhook_pipeline::{self, PipelineError};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use reactorcide_providers::WebhookRequest;

pub async fn receive(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<StatusResponse>, PipelineError> {
    let request = WebhookRequest {
        headers: headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect(),
        body: body.to_vec(),
    };

    webhook_pipeline::run(&state, &provider, request).await?;
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
#[path = "webhooks_tests.rs"]
mod tests;
