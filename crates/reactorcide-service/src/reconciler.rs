//! # Status Reconciler
//!
//! Invoked after every job-status transition (§4.K): maps a [`Job`] onto a
//! generic commit state and description, resolves a VCS token for the
//! owning project (falling back to the global configuration), and posts the
//! update back to the provider. Also posts a terminal-state PR comment.
//! Every provider call here is best-effort — failures are logged and never
//! propagated, since the reconciler is expected to be re-invoked on the
//! next status transition rather than retried in place.

use crate::AppState;
use reactorcide_core::job::{Job, JobStatus};
use reactorcide_core::notes::JobNotes;
use reactorcide_core::project::Project;
use reactorcide_providers::{GenericStatusState, ProviderAdapter, StatusUpdate};
use std::sync::Arc;
use tracing::{info, warn};

const ERROR_TRUNCATE_LEN: usize = 44;

fn generic_state(status: JobStatus) -> GenericStatusState {
    match status {
        JobStatus::Submitted | JobStatus::Queued => GenericStatusState::Pending,
        JobStatus::Running => GenericStatusState::Running,
        JobStatus::Completed => GenericStatusState::Success,
        JobStatus::Failed => GenericStatusState::Failure,
        JobStatus::Cancelled => GenericStatusState::Cancelled,
        JobStatus::Timeout => GenericStatusState::Error,
    }
}

fn truncate_error(message: &str) -> String {
    if message.chars().count() <= ERROR_TRUNCATE_LEN {
        return message.to_string();
    }
    let truncated: String = message.chars().take(ERROR_TRUNCATE_LEN).collect();
    format!("{truncated}…")
}

fn description(job: &Job) -> String {
    match job.status {
        JobStatus::Completed => match job.exit_code {
            Some(0) | None => "CI build passed".to_string(),
            Some(code) => format!("CI build failed (exit code {code})"),
        },
        JobStatus::Failed => match &job.last_error {
            Some(err) => format!("CI build failed: {}", truncate_error(err)),
            None => "CI build failed".to_string(),
        },
        JobStatus::Timeout => "CI build timed out".to_string(),
        JobStatus::Cancelled => "CI build cancelled".to_string(),
        JobStatus::Running => "CI build running".to_string(),
        JobStatus::Submitted | JobStatus::Queued => "CI build queued".to_string(),
    }
}

/// Resolve a VCS bearer/private token for `project` against `provider_name`:
/// the project's own `vcs_token_secret` first, falling back to the
/// globally-configured token for that provider. Returns `None` if neither
/// resolves, in which case the caller must no-op rather than call the
/// provider with an empty credential.
pub async fn resolve_vcs_token(state: &AppState, project: &Project, provider_name: &str) -> Option<String> {
    if let Some((path, key)) = reactorcide_core::secrets::parse_secret_ref(&project.vcs_token_secret) {
        if let Ok(token) = state.secrets.get(&project.project_id.to_string(), &path, &key).await {
            if !token.is_empty() {
                return Some(token);
            }
        }
    }
    state.config.global_vcs_tokens.get(provider_name).cloned()
}

/// Run the reconciler for `job`, whose `notes` blob is assumed to already
/// reflect the latest persisted state.
pub async fn reconcile(state: &AppState, job: &Job) {
    let Some(notes) = job.notes.as_deref().and_then(JobNotes::from_blob) else {
        return;
    };
    if notes.is_eval {
        return;
    }

    let Some(adapter) = state.providers.get(notes.vcs_provider.as_str()).cloned() else {
        warn!(job_id = %job.job_id, provider = %notes.vcs_provider, "unknown provider in job notes; skipping reconcile");
        return;
    };

    let token = match job.project_id {
        Some(project_id) => match state.projects.get(project_id).await {
            Ok(Some(project)) => resolve_vcs_token(state, &project, &notes.vcs_provider).await,
            _ => state.config.global_vcs_tokens.get(notes.vcs_provider.as_str()).cloned(),
        },
        None => state.config.global_vcs_tokens.get(notes.vcs_provider.as_str()).cloned(),
    };
    let Some(token) = token else {
        info!(job_id = %job.job_id, "no VCS token resolvable; skipping status reconcile");
        return;
    };

    post_status(state, &adapter, &notes, job, &token).await;

    if notes.pr_number.is_some() && job.status.is_terminal() {
        post_comment(&adapter, &notes, job, &token).await;
    }
}

async fn post_status(
    _state: &AppState,
    adapter: &Arc<dyn ProviderAdapter>,
    notes: &JobNotes,
    job: &Job,
    token: &str,
) {
    let update = StatusUpdate {
        sha: notes.commit_sha.clone(),
        state: generic_state(job.status),
        target_url: String::new(),
        description: description(job),
        context: notes.status_context.clone(),
    };

    if let Err(e) = adapter.post_status(&notes.repo, token, &update).await {
        warn!(job_id = %job.job_id, error = %e, "failed to post reconciled commit status");
    }
}

async fn post_comment(adapter: &Arc<dyn ProviderAdapter>, notes: &JobNotes, job: &Job, token: &str) {
    let Some(pr_number) = notes.pr_number else {
        return;
    };

    let duration = match (job.started_at, job.completed_at) {
        (Some(start), Some(end)) => Some(end.seconds_since(&start)),
        _ => None,
    };

    let mut body = format!("**CI status:** {}\n\n", description(job));
    if let Some(code) = job.exit_code {
        body.push_str(&format!("- Exit code: `{code}`\n"));
    }
    if let Some(seconds) = duration {
        body.push_str(&format!("- Duration: {seconds}s\n"));
    }
    if job.status == JobStatus::Failed {
        if let Some(err) = &job.last_error {
            body.push_str(&format!("\n```\n{}\n```\n", truncate_error(err)));
        }
    }

    if let Err(e) = adapter.post_comment(&notes.repo, pr_number, token, &body).await {
        warn!(job_id = %job.job_id, error = %e, "failed to post reconciled PR comment");
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
