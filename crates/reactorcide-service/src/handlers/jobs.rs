//! Job CRUD, cancellation, log retrieval, and the eval→child-jobs trigger
//! endpoint.

use crate::auth::require_token;
use crate::errors::ApiError;
use crate::reconciler;
use crate::responses::{
    CreateJobRequest, JobListQuery, JobResponse, LogLineResponse, LogsQuery, TriggerChildJob, TriggerRequest,
    TriggerResponse,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use reactorcide_core::dispatcher::{DispatchConfig, DispatchPayload, DispatchSource};
use reactorcide_core::job::{Job, JobStatus};
use reactorcide_core::job_store::JobFilters;
use reactorcide_core::object_store::{merge_combined, stream_key, LogLine};
use reactorcide_core::notes::JobNotes;
use reactorcide_core::{CoreError, JobId, Timestamp};
use std::str::FromStr;

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    require_token(&state, &headers)?;

    let filters = JobFilters {
        user_id: None,
        status: query.status,
        queue_name: query.queue_name,
        source_type: query.source_type,
    };
    let jobs = state.jobs.list(filters, query.limit, query.offset).await?;
    Ok(Json(jobs.iter().map(JobResponse::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    require_token(&state, &headers)?;

    state.config.ci_allowlist.enforce(&request.ci_source_type, &request.ci_source_url)?;

    let now = Timestamp::now();
    let mut job = Job {
        job_id: JobId::new(),
        project_id: request.project_id,
        dispatcher_task_id: None,
        name: request.name,
        source_type: request.source_type,
        source_url: request.source_url,
        source_ref: request.source_ref,
        source_path: request.source_path,
        ci_source_type: request.ci_source_type,
        ci_source_url: request.ci_source_url,
        ci_source_ref: request.ci_source_ref,
        job_command: request.job_command,
        runner_image: request.runner_image,
        code_dir: String::new(),
        job_dir: String::new(),
        env_vars: request.env_vars,
        env_file: String::new(),
        timeout_seconds: request.timeout_seconds,
        priority: request.priority,
        queue_name: request.queue_name,
        status: JobStatus::Submitted,
        exit_code: None,
        started_at: None,
        completed_at: None,
        logs_object_key: None,
        last_error: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    job = state.jobs.create(job).await?;
    job = dispatch(&state, job).await?;
    Ok(Json(JobResponse::from(&job)))
}

async fn dispatch(state: &AppState, mut job: Job) -> Result<Job, ApiError> {
    let payload = DispatchPayload {
        job_id: job.job_id.to_string(),
        config: DispatchConfig {
            command: job.job_command.clone(),
            image: job.runner_image.clone(),
            timeout_seconds: job.timeout_seconds,
            env_vars: job.env_vars.clone(),
        },
        source: DispatchSource {
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
            tracing::warn!(job_id = %job.job_id, error = %e, "dispatcher submission failed; marking job failed");
            job.status = JobStatus::Failed;
            job.last_error = Some(e.to_string());
        }
    }
    let job = state.jobs.update(job).await?;
    reconciler::reconcile(state, &job).await;
    Ok(job)
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::from_str(raw).map_err(|_| CoreError::InvalidInput(format!("'{raw}' is not a valid job id")).into())
}

async fn fetch(state: &AppState, id: &str) -> Result<Job, ApiError> {
    let job_id = parse_job_id(id)?;
    state
        .jobs
        .get(job_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("job '{id}' not found")).into())
}

pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    require_token(&state, &headers)?;
    let job = fetch(&state, &id).await?;
    Ok(Json(JobResponse::from(&job)))
}

pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<crate::responses::StatusResponse>, ApiError> {
    require_token(&state, &headers)?;
    let job_id = parse_job_id(&id)?;
    state.jobs.delete(job_id).await?;
    Ok(Json(crate::responses::StatusResponse::ok()))
}

pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    require_token(&state, &headers)?;
    let mut job = fetch(&state, &id).await?;

    if let Some(task_id) = job.dispatcher_task_id.clone() {
        if let Err(e) = state.dispatcher.cancel(&task_id, job.status).await {
            tracing::warn!(job_id = %job.job_id, error = %e, "dispatcher cancel failed; cancelling locally anyway");
        }
    }
    job.status = JobStatus::Cancelled;
    job.completed_at = Some(Timestamp::now());
    job = state.jobs.update(job).await?;
    reconciler::reconcile(&state, &job).await;

    Ok(Json(JobResponse::from(&job)))
}

pub async fn logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<LogLineResponse>>, ApiError> {
    require_token(&state, &headers)?;
    let job = fetch(&state, &id).await?;

    let lines = match query.stream.as_str() {
        "stdout" => read_stream(&state, job.job_id, "stdout").await?,
        "stderr" => read_stream(&state, job.job_id, "stderr").await?,
        "combined" => {
            let stdout = read_stream(&state, job.job_id, "stdout").await?;
            let stderr = read_stream(&state, job.job_id, "stderr").await?;
            merge_combined(stdout, stderr)
        }
        other => return Err(CoreError::InvalidInput(format!("unknown log stream '{other}'")).into()),
    };

    Ok(Json(lines.into_iter().map(LogLineResponse::from).collect()))
}

async fn read_stream(state: &AppState, job_id: JobId, stream: &str) -> Result<Vec<LogLine>, ApiError> {
    let key = stream_key(job_id, stream);
    match state.object_store.get(&key).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_default()),
        Err(reactorcide_core::object_store::ObjectStoreError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(CoreError::ServiceUnavailable(e.to_string()).into()),
    }
}

/// `POST /jobs/{id}/triggers` — the eval job at `id` reports which real CI
/// jobs to enqueue. Every child inherits the parent's source identity
/// verbatim; only execution parameters come from the request body.
pub async fn trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    require_token(&state, &headers)?;
    let parent = fetch(&state, &id).await?;

    let parent_notes = parent.notes.as_deref().and_then(JobNotes::from_blob);

    let mut created = Vec::with_capacity(request.children.len());
    for child_spec in request.children {
        let job = build_child_job(&parent, &child_spec, parent_notes.as_ref());
        let job = state.jobs.create(job).await?;
        let job = dispatch(&state, job).await?;
        created.push(JobResponse::from(&job));
    }

    Ok(Json(TriggerResponse { jobs: created }))
}

fn build_child_job(parent: &Job, spec: &TriggerChildJob, parent_notes: Option<&JobNotes>) -> Job {
    let now = Timestamp::now();
    let notes = parent_notes.map(|notes| {
        JobNotes {
            vcs_provider: notes.vcs_provider.clone(),
            repo: notes.repo.clone(),
            pr_number: notes.pr_number,
            branch: notes.branch.clone(),
            commit_sha: notes.commit_sha.clone(),
            status_context: format!("reactorcide/{}", spec.name),
            is_eval: false,
        }
        .to_blob()
    });

    Job {
        job_id: JobId::new(),
        project_id: parent.project_id,
        dispatcher_task_id: None,
        name: spec.name.clone(),
        source_type: parent.source_type,
        source_url: parent.source_url.clone(),
        source_ref: parent.source_ref.clone(),
        source_path: parent.source_path.clone(),
        ci_source_type: parent.ci_source_type.clone(),
        ci_source_url: parent.ci_source_url.clone(),
        ci_source_ref: parent.ci_source_ref.clone(),
        job_command: spec.job_command.clone(),
        runner_image: spec.runner_image.clone(),
        code_dir: String::new(),
        job_dir: String::new(),
        env_vars: spec.env_vars.clone(),
        env_file: String::new(),
        timeout_seconds: spec.timeout_seconds,
        priority: parent.priority,
        queue_name: spec.queue_name.clone(),
        status: JobStatus::Submitted,
        exit_code: None,
        started_at: None,
        completed_at: None,
        logs_object_key: None,
        last_error: None,
        notes,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
