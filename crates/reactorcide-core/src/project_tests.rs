use super::test_support::empty_project;
use super::*;
use crate::event_classifier::GenericEvent;

#[test]
fn empty_allowed_events_and_branches_means_all() {
    let project = empty_project();
    assert!(project.should_process_event(GenericEvent::Push, "any-branch"));
    assert!(project.should_process_event(GenericEvent::PullRequestOpened, "any-branch"));
}

#[test]
fn filters_by_allowed_event_type() {
    let mut project = empty_project();
    project.allowed_event_types = HashSet::from([GenericEvent::Push]);
    assert!(project.should_process_event(GenericEvent::Push, "main"));
    assert!(!project.should_process_event(GenericEvent::PullRequestOpened, "main"));
}

#[test]
fn filters_by_target_branch() {
    let mut project = empty_project();
    project.target_branches = vec!["main".to_string()];
    assert!(project.should_process_event(GenericEvent::Push, "main"));
    assert!(!project.should_process_event(GenericEvent::Push, "feature/x"));
}

#[test]
fn push_to_feature_branch_with_main_only_target_is_filtered() {
    let mut project = empty_project();
    project.allowed_event_types = HashSet::from([GenericEvent::Push, GenericEvent::PullRequestOpened]);
    project.target_branches = vec!["main".to_string()];
    assert!(!project.should_process_event(GenericEvent::Push, "feature/x"));
    assert!(project.should_process_event(GenericEvent::Push, "main"));
}

#[test]
fn canonical_repo_url_matches_url_canon() {
    assert_eq!(
        Project::canonical_repo_url("https://github.com/org/repo.git"),
        "github.com/org/repo"
    );
}
