use super::*;
use crate::event::{PullRequestInfo, PushInfo, RepoInfo};
use crate::project::test_support::empty_project;

fn pr_event() -> Event {
    Event {
        provider: "github".to_string(),
        raw_event_type: "pull_request".to_string(),
        repo: RepoInfo {
            full_name: "org/repo".to_string(),
            clone_url: "https://github.com/org/repo.git".to_string(),
        },
        pr: Some(PullRequestInfo {
            number: 42,
            action: "opened".to_string(),
            merged: false,
            head_sha: "abc1234567890".to_string(),
            head_ref: "feature-branch".to_string(),
            base_ref: "main".to_string(),
        }),
        push: None,
        raw_payload: serde_json::json!({}),
    }
}

fn push_event(git_ref: &str, after: &str) -> Event {
    Event {
        provider: "github".to_string(),
        raw_event_type: "push".to_string(),
        repo: RepoInfo {
            full_name: "org/repo".to_string(),
            clone_url: "https://github.com/org/repo.git".to_string(),
        },
        pr: None,
        push: Some(PushInfo { git_ref: git_ref.to_string(), after: after.to_string() }),
        raw_payload: serde_json::json!({}),
    }
}

fn dedicated_ci_project() -> Project {
    let mut project = empty_project();
    project.default_ci_source_url = "https://github.com/org/ci-repo.git".to_string();
    project.default_ci_source_ref = "main".to_string();
    project.default_image = "runner:latest".to_string();
    project.default_timeout_seconds = 1800;
    project
}

#[test]
fn scenario_1_pr_opened_dedicated_ci_repo() {
    let project = dedicated_ci_project();
    let event = pr_event();
    let job = build_eval_job(&project, &event, GenericEvent::PullRequestOpened);

    assert_eq!(job.name, "eval: PR #42 opened on org/repo");
    assert_eq!(job.priority, 10);
    assert_eq!(job.source_url, "https://github.com/org/repo.git");
    assert_eq!(job.source_ref, "abc1234567890");
    assert_eq!(job.ci_source_url, "https://github.com/org/ci-repo.git");
    assert_eq!(job.ci_source_ref, "main");
    assert_eq!(job.env_vars.get(ENV_PR_NUMBER).unwrap(), "42");
    assert_eq!(job.env_vars.get(ENV_PR_BASE_REF).unwrap(), "main");
    assert_eq!(job.env_vars.get(ENV_EVENT_TYPE).unwrap(), "pull_request_opened");
}

#[test]
fn scenario_2_push_same_repo_mode() {
    let project = dedicated_ci_project_without_ci_repo();
    let event = push_event("refs/heads/main", "sha1234567890abc");
    let job = build_eval_job(&project, &event, GenericEvent::Push);

    assert_eq!(job.name, "eval: push to main (sha1234) on org/repo");
    assert_eq!(job.priority, 5);
    assert_eq!(job.ci_source_url, job.source_url);
    assert_eq!(job.ci_source_ref, job.source_ref);
    assert_eq!(job.ci_source_ref, "sha1234567890abc");

    fn dedicated_ci_project_without_ci_repo() -> Project {
        let mut project = dedicated_ci_project();
        project.default_ci_source_url = String::new();
        project
    }
}

#[test]
fn same_repo_mode_invariant_holds_for_any_project_without_ci_url() {
    let project = empty_project();
    let event = push_event("refs/heads/main", "deadbeef");
    let job = build_eval_job(&project, &event, GenericEvent::Push);
    assert_eq!(job.ci_source_url, job.source_url);
    assert_eq!(job.ci_source_ref, job.source_ref);
}

#[test]
fn ci_source_type_defaults_to_git_when_dedicated_repo_type_blank() {
    let project = dedicated_ci_project();
    assert!(project.default_ci_source_type.is_empty());
    let job = build_eval_job(&project, &pr_event(), GenericEvent::PullRequestOpened);
    assert_eq!(job.ci_source_type, "git");
}

#[test]
fn default_job_command_used_when_project_supplies_none() {
    let project = empty_project();
    let job = build_eval_job(&project, &pr_event(), GenericEvent::PullRequestOpened);
    assert_eq!(
        job.job_command,
        "runnerlib eval --event-type $REACTORCIDE_EVENT_TYPE --branch $REACTORCIDE_BRANCH"
    );
}

#[test]
fn project_job_command_overrides_default() {
    let mut project = empty_project();
    project.default_job_command = "make ci".to_string();
    let job = build_eval_job(&project, &pr_event(), GenericEvent::PullRequestOpened);
    assert_eq!(job.job_command, "make ci");
}

#[test]
fn pr_merged_label_differs_from_closed() {
    let project = empty_project();
    let mut event = pr_event();
    event.pr.as_mut().unwrap().action = "closed".to_string();
    event.pr.as_mut().unwrap().merged = true;
    let job = build_eval_job(&project, &event, GenericEvent::PullRequestMerged);
    assert_eq!(job.name, "eval: PR #42 merged on org/repo");
}

#[test]
fn zero_timeout_is_left_zero_for_the_store_default() {
    let project = empty_project();
    assert_eq!(project.default_timeout_seconds, 0);
    let job = build_eval_job(&project, &pr_event(), GenericEvent::PullRequestOpened);
    assert_eq!(job.timeout_seconds, 0);
}
