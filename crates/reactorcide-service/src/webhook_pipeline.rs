//! # Webhook Pipeline
//!
//! The thirteen-step request lifecycle of §4.J: buffer, peek, look up the
//! owning project, resolve its secret, validate, parse, classify, filter,
//! build the eval job, enforce the CI allowlist, persist, dispatch, and post
//! a pending status. Every step runs strictly in order within one request;
//! nothing here is observable by another request until it commits.

use crate::AppState;
use reactorcide_core::event_classifier::{classify, strip_ref_prefix};
use reactorcide_core::job_builder::build_eval_job;
use reactorcide_core::notes::JobNotes;
use reactorcide_providers::{extract_form_payload, GenericStatusState, ProviderError, StatusUpdate, WebhookRequest};
use serde_json::Value;
use tracing::{info, warn};

/// The outcome of one webhook delivery, already folded onto the two
/// response shapes the pipeline ever produces.
#[derive(Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Step 13: the event was accepted and processed (including the
    /// "filtered"/"unknown" no-op cases of steps 7-8, which the caller still
    /// reports as success).
    Processed { job_id: Option<String> },
}

/// Pipeline-specific failures, each carrying the HTTP status §4.J and §7
/// assign it. `SecretNotConfigured` covers both "no project found" (step 3)
/// and "secret unresolvable" (step 4) — both are reported identically to the
/// caller, since in both cases validation is impossible without exposing
/// which is true (that would let a prober enumerate configured projects).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("webhook secret not configured")]
    SecretNotConfigured,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unknown webhook provider '{0}'")]
    UnknownProvider(String),

    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

impl From<ProviderError> for PipelineError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::InvalidSignature | ProviderError::MissingSecret => Self::InvalidSignature,
            ProviderError::MalformedPayload(m) => Self::MalformedPayload(m),
            other => Self::MalformedPayload(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for PipelineError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            // §4.J step 3/4: a project or secret that can't be resolved is a
            // 500, since the project is what carries the secret and there is
            // no client-correctable input here.
            Self::SecretNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::UnknownProvider(_) => StatusCode::NOT_FOUND,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        };
        let kind = match &self {
            Self::SecretNotConfigured => "webhook_secret_not_configured",
            Self::InvalidSignature => "invalid_signature",
            Self::UnknownProvider(_) => "unknown_provider",
            Self::BodyTooLarge => "body_too_large",
            Self::MalformedPayload(_) => "malformed_payload",
        };
        let body = crate::errors::ErrorBody { error: kind, message: self.to_string() };
        (status, axum::Json(body)).into_response()
    }
}

/// Peek the top-level clone-URL field the relevant provider convention uses,
/// without trusting anything else in the body (step 2). Supports the
/// form-encoded `payload=` variant. Returns `None` if no recognizable shape
/// is found — the caller still proceeds to full validation, since step 3
/// only needs *a* URL to look up the project, and an unparseable peek simply
/// means no project will be found.
fn peek_clone_url(body: &[u8]) -> Option<String> {
    let bytes = extract_form_payload(body).unwrap_or_else(|| body.to_vec());
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    value
        .pointer("/repository/clone_url")
        .or_else(|| value.pointer("/project/git_http_url"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub async fn run(
    state: &AppState,
    provider_name: &str,
    request: WebhookRequest,
) -> Result<PipelineOutcome, PipelineError> {
    // Step 1: body already buffered by the HTTP extractor; enforce the size
    // limit here since the caller handed us the raw bytes.
    if request.body.len() > state.config.server.max_webhook_body_bytes {
        return Err(PipelineError::BodyTooLarge);
    }

    let adapter = state
        .providers
        .get(provider_name)
        .cloned()
        .ok_or_else(|| PipelineError::UnknownProvider(provider_name.to_string()))?;

    // Step 2.
    let peeked_url = peek_clone_url(&request.body);

    // Step 3: project lookup by the untrusted peeked URL.
    let project = match &peeked_url {
        Some(url) => state.projects.lookup_by_repo_url(url).await.map_err(|_| PipelineError::SecretNotConfigured)?,
        None => None,
    };
    let Some(project) = project else {
        return Err(PipelineError::SecretNotConfigured);
    };

    // Step 4: resolve the project's webhook secret.
    let secret = match reactorcide_core::secrets::parse_secret_ref(&project.webhook_secret) {
        Some((path, key)) => state.secrets.get(&project.project_id.to_string(), &path, &key).await.unwrap_or_default(),
        None => String::new(),
    };
    if secret.is_empty() {
        return Err(PipelineError::SecretNotConfigured);
    }

    // Step 5: signature validation must precede trusting any parsed field.
    adapter.validate(&request, &secret)?;

    // Step 6: now that the signature is verified, parse for real.
    let event = adapter.parse(&request)?;

    // The peeked URL and the validated one must agree; otherwise something
    // is inconsistent in the payload and we treat it as a parse failure
    // rather than silently proceeding against the wrong project (§4.J note).
    if let Some(peeked) = &peeked_url {
        if !reactorcide_core::url_canon::matches(peeked, &event.repo.clone_url) {
            return Err(PipelineError::MalformedPayload(
                "peeked and parsed clone URLs disagree".to_string(),
            ));
        }
    }

    // Step 7: classify.
    let generic_event = classify(&event.to_raw_classification());
    if generic_event == reactorcide_core::event_classifier::GenericEvent::Unknown {
        info!(provider = provider_name, "webhook classified as unknown; no-op");
        return Ok(PipelineOutcome::Processed { job_id: None });
    }

    // Step 8: branch/tag filter.
    let branch_or_tag = event
        .pr
        .as_ref()
        .map(|pr| pr.base_ref.clone())
        .or_else(|| event.push.as_ref().map(|push| strip_ref_prefix(&push.git_ref).to_string()))
        .unwrap_or_default();
    if !project.should_process_event(generic_event, &branch_or_tag) {
        info!(project = %project.project_id, "event filtered by project configuration; no-op");
        return Ok(PipelineOutcome::Processed { job_id: None });
    }

    // Step 9: build the eval job and enforce the CI allowlist.
    let mut job = build_eval_job(&project, &event, generic_event);
    state
        .config
        .ci_allowlist
        .enforce(&job.ci_source_type, &job.ci_source_url)
        .map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;

    // Step 10: attach notes and persist.
    let notes = JobNotes {
        vcs_provider: provider_name.to_string(),
        repo: event.repo.full_name.clone(),
        pr_number: event.pr.as_ref().map(|pr| pr.number),
        branch: event.pr.is_none().then(|| branch_or_tag.clone()),
        commit_sha: job.source_ref.clone(),
        status_context: "reactorcide/eval".to_string(),
        is_eval: true,
    };
    job.notes = Some(notes.to_blob());
    let job = state.jobs.create(job).await.map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;

    // Step 11: dispatch.
    let mut job = job;
    let payload = reactorcide_core::dispatcher::DispatchPayload {
        job_id: job.job_id.to_string(),
        config: reactorcide_core::dispatcher::DispatchConfig {
            command: job.job_command.clone(),
            image: job.runner_image.clone(),
            timeout_seconds: job.timeout_seconds,
            env_vars: job.env_vars.clone(),
        },
        source: reactorcide_core::dispatcher::DispatchSource {
            source_type: job.source_type.as_str().to_string(),
            source_url: job.source_url.clone(),
            source_ref: job.source_ref.clone(),
            ci_source_type: job.ci_source_type.clone(),
            ci_source_url: job.ci_source_url.clone(),
            ci_source_ref: job.ci_source_ref.clone(),
        },
        metadata: Default::default(),
    };

    match state.dispatcher.submit(payload, job.priority).await {
        Ok(handle) => {
            job.dispatcher_task_id = Some(handle.task_id);
            job.status = handle.state;
        }
        Err(e) => {
            crate::metrics::dispatch_submit_failure_total().with_label_values(&[job.queue_name.as_str()]).inc();
            warn!(job_id = %job.job_id, error = %e, "dispatcher submission failed; marking job failed");
            job.status = reactorcide_core::job::JobStatus::Failed;
            job.last_error = Some(e.to_string());
        }
    }
    let job = state.jobs.update(job).await.map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;

    // Step 12: pending commit status, best-effort.
    post_pending_status(state, &adapter, &project, &event, &job, &notes).await;

    // Step 13.
    Ok(PipelineOutcome::Processed { job_id: Some(job.job_id.to_string()) })
}

async fn post_pending_status(
    state: &AppState,
    adapter: &std::sync::Arc<dyn reactorcide_providers::ProviderAdapter>,
    project: &reactorcide_core::project::Project,
    event: &reactorcide_core::event::Event,
    job: &reactorcide_core::job::Job,
    notes: &JobNotes,
) {
    let token = crate::reconciler::resolve_vcs_token(state, project, adapter.name()).await;
    let Some(token) = token else {
        warn!(job_id = %job.job_id, "no VCS token available; skipping pending status post");
        return;
    };

    let update = StatusUpdate {
        sha: job.source_ref.clone(),
        state: GenericStatusState::Pending,
        target_url: format!("{}/jobs/{}", state.config.vcs_base_url, job.job_id),
        description: "CI build queued".to_string(),
        context: notes.status_context.clone(),
    };

    if let Err(e) = adapter.post_status(&event.repo.full_name, &token, &update).await {
        warn!(job_id = %job.job_id, error = %e, "failed to post pending commit status");
    }
}

#[cfg(test)]
#[path = "webhook_pipeline_tests.rs"]
mod tests;
