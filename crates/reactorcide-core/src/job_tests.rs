use super::*;

#[test]
fn terminal_statuses() {
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
    assert!(JobStatus::Cancelled.is_terminal());
    assert!(JobStatus::Timeout.is_terminal());
    assert!(!JobStatus::Submitted.is_terminal());
    assert!(!JobStatus::Queued.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
}

#[test]
fn source_type_strings() {
    assert_eq!(SourceType::Git.as_str(), "git");
    assert_eq!(SourceType::Copy.as_str(), "copy");
    assert_eq!(SourceType::None.as_str(), "none");
}
