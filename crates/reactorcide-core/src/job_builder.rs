//! # Eval-Job Builder
//!
//! Deterministically constructs the "eval" job — the short, project-owned
//! job whose sole purpose is to decide which real CI jobs to enqueue — from
//! a [`Project`] and a normalized [`Event`]. This is the one place the
//! dual-source model (untrusted code under test vs. trusted CI-pipeline
//! code) is assembled; [`crate::allowlist`] is what keeps it honest.

use crate::event::Event;
use crate::event_classifier::{classify, strip_ref_prefix, GenericEvent};
use crate::job::{Job, JobStatus, SourceType};
use crate::project::Project;
use crate::{JobId, Timestamp};
use std::collections::HashMap;

const ENV_CI: &str = "REACTORCIDE_CI";
const ENV_PROVIDER: &str = "REACTORCIDE_PROVIDER";
const ENV_EVENT_TYPE: &str = "REACTORCIDE_EVENT_TYPE";
const ENV_REPO: &str = "REACTORCIDE_REPO";
const ENV_SOURCE_URL: &str = "REACTORCIDE_SOURCE_URL";
const ENV_SHA: &str = "REACTORCIDE_SHA";
const ENV_BRANCH: &str = "REACTORCIDE_BRANCH";
const ENV_CI_SOURCE_URL: &str = "REACTORCIDE_CI_SOURCE_URL";
const ENV_CI_SOURCE_REF: &str = "REACTORCIDE_CI_SOURCE_REF";
const ENV_PR_NUMBER: &str = "REACTORCIDE_PR_NUMBER";
const ENV_PR_REF: &str = "REACTORCIDE_PR_REF";
const ENV_PR_BASE_REF: &str = "REACTORCIDE_PR_BASE_REF";

const PRIORITY_PR: i32 = 10;
const PRIORITY_OTHER: i32 = 5;

/// Build the eval job for `project` reacting to `event`, already known (by
/// the caller) to classify as `generic_event`.
///
/// # Panics
///
/// Never panics; malformed events (e.g. a PR event with no PR facts) simply
/// produce a job with empty source fields, since by the time this is called
/// the webhook pipeline has already classified the event successfully.
///
/// # Examples
///
/// ```rust
/// use reactorcide_core::event::{Event, PullRequestInfo, RepoInfo};
/// use reactorcide_core::event_classifier::GenericEvent;
/// use reactorcide_core::job_builder::build_eval_job;
/// use reactorcide_core::project::test_support::empty_project;
///
/// let project = empty_project();
/// let event = Event {
///     provider: "github".to_string(),
///     raw_event_type: "pull_request".to_string(),
///     repo: RepoInfo {
///         full_name: "org/repo".to_string(),
///         clone_url: "https://github.com/org/repo.git".to_string(),
///     },
///     pr: Some(PullRequestInfo {
///         number: 42,
///         action: "opened".to_string(),
///         merged: false,
///         head_sha: "abc1234567890".to_string(),
///         head_ref: "feature-branch".to_string(),
///         base_ref: "main".to_string(),
///     }),
///     push: None,
///     raw_payload: serde_json::json!({}),
/// };
///
/// let job = build_eval_job(&project, &event, GenericEvent::PullRequestOpened);
/// assert_eq!(job.source_ref, "abc1234567890");
/// assert_eq!(job.ci_source_url, job.source_url);
/// assert_eq!(job.priority, 10);
/// ```
pub fn build_eval_job(project: &Project, event: &Event, generic_event: GenericEvent) -> Job {
    let source_url = event.repo.clone_url.clone();

    let (source_ref, display_branch, is_pr) = match (&event.pr, &event.push) {
        (Some(pr), _) => (pr.head_sha.clone(), pr.base_ref.clone(), true),
        (None, Some(push)) => (push.after.clone(), strip_ref_prefix(&push.git_ref).to_string(), false),
        (None, None) => (String::new(), String::new(), false),
    };

    let (ci_source_type, ci_source_url, ci_source_ref) = if !project.default_ci_source_url.is_empty() {
        let ci_type = if project.default_ci_source_type.is_empty() {
            "git".to_string()
        } else {
            project.default_ci_source_type.clone()
        };
        (ci_type, project.default_ci_source_url.clone(), project.default_ci_source_ref.clone())
    } else {
        ("git".to_string(), source_url.clone(), source_ref.clone())
    };

    let mut env_vars = HashMap::new();
    env_vars.insert(ENV_CI.to_string(), "true".to_string());
    env_vars.insert(ENV_PROVIDER.to_string(), event.provider.clone());
    env_vars.insert(ENV_EVENT_TYPE.to_string(), generic_event.as_str().to_string());
    env_vars.insert(ENV_REPO.to_string(), event.repo.full_name.clone());
    env_vars.insert(ENV_SOURCE_URL.to_string(), source_url.clone());
    env_vars.insert(ENV_SHA.to_string(), source_ref.clone());
    env_vars.insert(ENV_BRANCH.to_string(), display_branch.clone());
    env_vars.insert(ENV_CI_SOURCE_URL.to_string(), ci_source_url.clone());
    env_vars.insert(ENV_CI_SOURCE_REF.to_string(), ci_source_ref.clone());

    if let Some(pr) = &event.pr {
        env_vars.insert(ENV_PR_NUMBER.to_string(), pr.number.to_string());
        env_vars.insert(ENV_PR_REF.to_string(), pr.head_ref.clone());
        env_vars.insert(ENV_PR_BASE_REF.to_string(), pr.base_ref.clone());
    }

    let name = job_name(event, generic_event, &source_ref);

    let job_command = if project.default_job_command.is_empty() {
        "runnerlib eval --event-type $REACTORCIDE_EVENT_TYPE --branch $REACTORCIDE_BRANCH".to_string()
    } else {
        project.default_job_command.clone()
    };

    let now = Timestamp::now();
    Job {
        job_id: JobId::new(),
        project_id: Some(project.project_id),
        dispatcher_task_id: None,
        name,

        source_type: SourceType::Git,
        source_url,
        source_ref,
        source_path: String::new(),

        ci_source_type,
        ci_source_url,
        ci_source_ref,

        job_command,
        runner_image: project.default_image.clone(),
        code_dir: String::new(),
        job_dir: String::new(),
        env_vars,
        env_file: String::new(),
        timeout_seconds: project.default_timeout_seconds,
        priority: if is_pr { PRIORITY_PR } else { PRIORITY_OTHER },
        queue_name: project.default_queue_name.clone(),

        status: JobStatus::Submitted,
        exit_code: None,
        started_at: None,
        completed_at: None,
        logs_object_key: None,
        last_error: None,
        notes: None,

        created_at: now,
        updated_at: now,
    }
}

fn job_name(event: &Event, generic_event: GenericEvent, source_ref: &str) -> String {
    if let Some(pr) = &event.pr {
        let label = match generic_event {
            GenericEvent::PullRequestOpened => "opened",
            GenericEvent::PullRequestUpdated => "updated",
            GenericEvent::PullRequestMerged => "merged",
            GenericEvent::PullRequestClosed => "closed",
            _ => "updated",
        };
        format!("eval: PR #{} {} on {}", pr.number, label, event.repo.full_name)
    } else {
        let branch = event
            .push
            .as_ref()
            .map(|push| strip_ref_prefix(&push.git_ref).to_string())
            .unwrap_or_default();
        let sha7: String = source_ref.chars().take(7).collect();
        format!("eval: push to {} ({}) on {}", branch, sha7, event.repo.full_name)
    }
}

#[cfg(test)]
#[path = "job_builder_tests.rs"]
mod tests;
